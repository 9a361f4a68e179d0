//! Reply composition.

use haruno_onebot::{Message, Segment};

/// Sent when the mention carried no question.
pub const UNHEARD_TEXT: &str = "我听不清，你在说什么呀？";

/// Sent when the provider answered with a non-success code.
pub const UNKNOWN_ANSWER_TEXT: &str = "？";

/// Builds a reply: a mention of `sender_id` followed by `content`.
pub fn compose_reply(sender_id: i64, content: Segment) -> Message {
    Message::new().at(sender_id).segment(content)
}

/// The reply for an empty question.
pub fn unheard_reply(sender_id: i64) -> Message {
    compose_reply(sender_id, Segment::text(UNHEARD_TEXT))
}

/// The reply carrying a provider answer, or [`UNKNOWN_ANSWER_TEXT`] when
/// there is none. Provider text never leaks through without an answer.
pub fn answer_reply(sender_id: i64, answer: Option<&str>) -> Message {
    let text = answer.unwrap_or(UNKNOWN_ANSWER_TEXT);
    compose_reply(sender_id, Segment::text(text))
}
