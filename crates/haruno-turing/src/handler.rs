//! Event handler: question extraction, answer lookup and reply dispatch.

use std::sync::Arc;

use haruno_onebot::{ChatEvent, Message};
use tracing::{debug, error, info};

use crate::answer::AnswerProvider;
use crate::error::TransportError;
use crate::filter::SkipReason;
use crate::reply::{answer_reply, unheard_reply};
use crate::sender::GroupSender;

/// A reply that was dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Destination group.
    pub group_id: i64,
    /// The dispatched message.
    pub message: Message,
}

/// Why handling stopped without a reply.
#[derive(Debug)]
pub enum AbortReason {
    /// The message body could not be parsed.
    MalformedMessage,
    /// The answer provider could not be reached or decoded.
    Transport(TransportError),
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedMessage => write!(f, "malformed message body"),
            Self::Transport(e) => write!(f, "{e}"),
        }
    }
}

/// Result of running one event through the pipeline.
#[derive(Debug)]
pub enum Outcome {
    /// A reply was dispatched.
    Sent(Reply),
    /// The event was not for us.
    Skipped(SkipReason),
    /// The event was for us but no reply was sent.
    Aborted(AbortReason),
}

impl Outcome {
    /// Returns the dispatched reply, if any.
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Self::Sent(reply) => Some(reply),
            _ => None,
        }
    }

    /// Returns true if a reply was dispatched.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Returns the first text segment that is non-empty after trimming,
/// trimmed. Later text segments are ignored.
pub fn extract_question(message: &Message) -> Option<&str> {
    message.texts().map(str::trim).find(|text| !text.is_empty())
}

/// Answers accepted events.
pub struct TuringHandler {
    name: String,
    provider: Arc<dyn AnswerProvider>,
    sender: Arc<dyn GroupSender>,
}

impl TuringHandler {
    /// Creates a handler. `name` identifies the plugin in log lines.
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn AnswerProvider>,
        sender: Arc<dyn GroupSender>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            sender,
        }
    }

    /// Handles an event the filter has accepted.
    ///
    /// Sends at most one reply. Parse and transport failures are logged and
    /// reported as [`Outcome::Aborted`].
    pub async fn handle(&self, event: &ChatEvent) -> Outcome {
        let message = match event.parse_message() {
            Ok(message) => message,
            Err(e) => {
                error!(plugin = %self.name, error = %e, "Failed to parse message");
                return Outcome::Aborted(AbortReason::MalformedMessage);
            }
        };

        let reply = match extract_question(&message) {
            None => unheard_reply(event.user_id),
            Some(question) => {
                debug!(plugin = %self.name, user_id = event.user_id, question, "Asking");
                match self.provider.fetch(question, event.user_id).await {
                    Ok(result) => answer_reply(event.user_id, result.answer()),
                    Err(e) => {
                        error!(plugin = %self.name, error = %e, "Failed to fetch answer");
                        return Outcome::Aborted(AbortReason::Transport(e));
                    }
                }
            }
        };

        let content = reply.to_cq_string();
        self.sender.send_group_msg(event.group_id, &content).await;
        info!(plugin = %self.name, group_id = event.group_id, "Sent: {content}");

        Outcome::Sent(Reply {
            group_id: event.group_id,
            message: reply,
        })
    }
}
