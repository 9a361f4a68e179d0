//! Inbound chat events.
//!
//! [`ChatEvent`] is a flat view of a OneBot v11 event carrying just the
//! fields the reply pipeline looks at. Discriminators and IDs that a given
//! event kind does not carry (a heartbeat has no `group_id`) default to
//! empty/zero, so any well-formed event parses and the decision of what to
//! do with it is left to the caller.
//!
//! ```text
//! post_type    "message" | "notice" | "request" | "meta_event"
//! message_type "group" | "private"
//! sub_type     "normal" | "anonymous" | "notice" | ...
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ParseResult;
use crate::message::Message;

/// `post_type` of message events.
pub const POST_TYPE_MESSAGE: &str = "message";
/// `message_type` of group messages.
pub const MESSAGE_TYPE_GROUP: &str = "group";
/// `sub_type` of ordinary (non-anonymous, non-system) group messages.
pub const SUB_TYPE_NORMAL: &str = "normal";

/// One inbound event as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Event category ("message", "notice", ...).
    #[serde(default)]
    pub post_type: String,
    /// Message category ("group", "private").
    #[serde(default)]
    pub message_type: String,
    /// Message sub-category ("normal", "anonymous", ...).
    #[serde(default)]
    pub sub_type: String,
    /// Originating group.
    #[serde(default)]
    pub group_id: i64,
    /// Sender's user ID.
    #[serde(default)]
    pub user_id: i64,
    /// The bot's own QQ ID.
    #[serde(default)]
    pub self_id: i64,
    /// Message body in CQ code string format.
    #[serde(default)]
    pub message: String,
}

impl ChatEvent {
    /// Parses an event from its JSON report.
    pub fn from_json(raw: &str) -> ParseResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Returns true for an ordinary group message.
    pub fn is_normal_group_message(&self) -> bool {
        self.post_type == POST_TYPE_MESSAGE
            && self.message_type == MESSAGE_TYPE_GROUP
            && self.sub_type == SUB_TYPE_NORMAL
    }

    /// Parses the message body.
    ///
    /// Every call parses afresh; nothing is cached on the event.
    pub fn parse_message(&self) -> ParseResult<Message> {
        Message::parse(&self.message)
    }
}
