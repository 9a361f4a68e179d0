//! Turing plugin configuration.
//!
//! Read from the `plugins.turing` section of the haruno configuration:
//!
//! ```toml
//! [plugins.turing]
//! name = "turing"
//! version = "1.0.0"
//! token = "your-tuling123-api-key"
//! groupNums = [123456, 654321]
//! ```

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{TuringError, TuringResult};

/// Name of the configuration section.
pub const PLUGIN_NAME: &str = "turing";

/// Default answer provider endpoint.
pub const DEFAULT_API_URL: &str = "http://www.tuling123.com/openapi/api";

/// The `plugins.turing` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuringConfig {
    /// Display name used in log lines.
    #[serde(default = "default_name")]
    pub name: String,

    /// Display version used in log lines.
    #[serde(default = "default_version")]
    pub version: String,

    /// Provider API key.
    ///
    /// Numeric keys are accepted as-is, since environment variables such as
    /// `HARUNO_PLUGINS__TURING__TOKEN=1234567890` reach here as numbers.
    #[serde(default, deserialize_with = "deserialize_token")]
    pub token: String,

    /// Groups the plugin answers in.
    #[serde(
        default,
        rename = "groupNums",
        alias = "group_nums",
        alias = "groupnums"
    )]
    pub group_nums: Vec<i64>,

    /// Provider endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in milliseconds. Unset means the HTTP client default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for TuringConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            token: String::new(),
            group_nums: Vec::new(),
            api_url: default_api_url(),
            timeout_ms: None,
        }
    }
}

fn default_name() -> String {
    PLUGIN_NAME.to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn deserialize_token<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TokenFormat {
        String(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match TokenFormat::deserialize(deserializer)? {
        TokenFormat::String(token) => token,
        TokenFormat::Signed(token) => token.to_string(),
        TokenFormat::Unsigned(token) => token.to_string(),
    })
}

impl TuringConfig {
    /// Checks that the section can drive a working plugin.
    pub fn validate(&self) -> TuringResult<()> {
        if self.token.trim().is_empty() {
            return Err(TuringError::invalid_config("token must not be empty"));
        }
        if let Err(e) = Url::parse(&self.api_url) {
            return Err(TuringError::invalid_config(format!(
                "api_url {:?} is not a valid URL: {e}",
                self.api_url
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(TuringError::invalid_config(
                "timeout_ms must be greater than 0",
            ));
        }
        Ok(())
    }

    /// `name@version`, the identifier used in log lines.
    pub fn display_name(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Request timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Builds the group allowlist.
    pub fn allowlist(&self) -> GroupAllowlist {
        self.group_nums.iter().copied().collect()
    }
}

/// The set of groups the pipeline is active in.
///
/// Built once at load time and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAllowlist {
    groups: HashSet<i64>,
}

impl GroupAllowlist {
    /// Returns true if the pipeline is active in `group_id`.
    pub fn contains(&self, group_id: i64) -> bool {
        self.groups.contains(&group_id)
    }

    /// Number of allowed groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no group is allowed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<i64> for GroupAllowlist {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
