//! Answer provider client.
//!
//! The provider is a single `GET` endpoint taking the API key, the question
//! and the asker's id as query parameters, answering with `{code, text}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::TuringConfig;
use crate::error::{TransportError, TransportResult, TuringError, TuringResult};

/// Provider code for a successful text answer.
pub const SUCCESS_CODE: i64 = 100000;

/// A decoded provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Provider status code.
    pub code: i64,
    /// Answer text; only meaningful when `code` is [`SUCCESS_CODE`].
    #[serde(default)]
    pub text: String,
}

impl AnswerResult {
    /// Returns the answer text if the provider reported success.
    pub fn answer(&self) -> Option<&str> {
        (self.code == SUCCESS_CODE).then_some(self.text.as_str())
    }
}

/// Something that can answer a question asked by a user.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Asks `question` on behalf of `user_id`.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if the request fails or the response
    /// cannot be decoded. A decoded response with a non-success code is
    /// not an error.
    async fn fetch(&self, question: &str, user_id: i64) -> TransportResult<AnswerResult>;
}

/// HTTP client for the tuling123 answer API.
#[derive(Debug, Clone)]
pub struct TuringClient {
    client: Client,
    api_url: String,
    token: String,
}

impl TuringClient {
    /// Creates a client with reqwest's default settings.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_url, token)
    }

    /// Creates a client around an existing [`Client`].
    pub fn with_client(client: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
        }
    }

    /// Creates a client from the plugin configuration.
    pub fn from_config(config: &TuringConfig) -> TuringResult<Self> {
        let mut builder = ClientBuilder::new();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TuringError::HttpClient)?;
        Ok(Self::with_client(client, &config.api_url, &config.token))
    }

    /// Creates a client with a request timeout.
    pub fn with_timeout(
        api_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> TuringResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(TuringError::HttpClient)?;
        Ok(Self::with_client(client, api_url, token))
    }

    /// The configured endpoint.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Builds the request URL. Parameters are form-urlencoded.
    pub fn request_url(&self, question: &str, user_id: i64) -> TransportResult<Url> {
        let user_id = user_id.to_string();
        Url::parse_with_params(
            &self.api_url,
            [
                ("key", self.token.as_str()),
                ("info", question),
                ("userid", user_id.as_str()),
            ],
        )
        .map_err(|e| TransportError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl AnswerProvider for TuringClient {
    async fn fetch(&self, question: &str, user_id: i64) -> TransportResult<AnswerResult> {
        let url = self.request_url(question, user_id)?;
        debug!(user_id, "Requesting answer");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!(%status, %body, "Answer response");

        // The provider reports failures through `code`, whatever the HTTP
        // status; only an undecodable body is a transport failure.
        let result: AnswerResult = match serde_json::from_str(&body) {
            Ok(result) => result,
            Err(_) if !status.is_success() => {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        if !status.is_success() {
            warn!(%status, code = result.code, "Answer API returned an error status");
        }
        debug!(code = result.code, "Answer received");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_answer_requires_success_code() {
        let ok = AnswerResult {
            code: SUCCESS_CODE,
            text: "你好".into(),
        };
        assert_eq!(ok.answer(), Some("你好"));

        let failed = AnswerResult {
            code: 40004,
            text: "当天请求次数已用完".into(),
        };
        assert_eq!(failed.answer(), None);
    }

    #[test]
    fn test_decode_without_text() {
        let result: AnswerResult = serde_json::from_str(r#"{"code":40001}"#).unwrap();
        assert_eq!(result.code, 40001);
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_request_url_encodes_params() {
        let client = TuringClient::new("http://example.com/openapi/api", "k&y");
        let url = client.request_url("你好 world&x=1", 42).unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("key".to_string(), "k&y".to_string()),
                ("info".to_string(), "你好 world&x=1".to_string()),
                ("userid".to_string(), "42".to_string()),
            ]
        );
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn test_request_url_invalid_endpoint() {
        let client = TuringClient::new("not a url", "k");
        assert!(matches!(
            client.request_url("hi", 1),
            Err(TransportError::InvalidUrl { .. })
        ));
    }

    // =========================================================================
    // HTTP tests
    // =========================================================================

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/openapi/api")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "secret".into()),
                Matcher::UrlEncoded("info".into(), "今天天气怎么样".into()),
                Matcher::UrlEncoded("userid".into(), "10001".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":100000,"text":"晴"}"#)
            .create_async()
            .await;

        let client = TuringClient::new(format!("{}/openapi/api", server.url()), "secret");
        let result = client.fetch("今天天气怎么样", 10001).await.unwrap();

        assert_eq!(result.answer(), Some("晴"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_plain_text_content_type() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/openapi/api")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body(r#"{"code":40004,"text":"limit"}"#)
            .create_async()
            .await;

        let client = TuringClient::new(format!("{}/openapi/api", server.url()), "k");
        let result = client.fetch("hi", 1).await.unwrap();
        assert_eq!(result.code, 40004);
        assert_eq!(result.answer(), None);
    }

    #[tokio::test]
    async fn test_fetch_error_status_with_answer_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/openapi/api")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":40001,"text":"key invalid"}"#)
            .create_async()
            .await;

        let client = TuringClient::new(format!("{}/openapi/api", server.url()), "k");
        let result = client.fetch("hi", 1).await.unwrap();
        assert_eq!(result.code, 40001);
        assert_eq!(result.answer(), None);
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/openapi/api")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = TuringClient::new(format!("{}/openapi/api", server.url()), "k");
        let err = client.fetch("hi", 1).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 502 }));
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_fetch_undecodable_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/openapi/api")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = TuringClient::new(format!("{}/openapi/api", server.url()), "k");
        let err = client.fetch("hi", 1).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = TuringClient::with_timeout(
            "http://127.0.0.1:1/openapi/api",
            "k",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.fetch("hi", 1).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
