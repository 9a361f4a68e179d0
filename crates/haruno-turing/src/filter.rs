//! Event filter: decides whether an event addresses the bot.

use haruno_onebot::ChatEvent;
use tracing::error;

use crate::config::GroupAllowlist;

/// Why an event was not handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not an ordinary group message.
    NotGroupMessage,
    /// The group is not in the allowlist.
    GroupNotAllowed(i64),
    /// The message body could not be parsed.
    MalformedMessage,
    /// The bot was not mentioned.
    NotMentioned,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotGroupMessage => write!(f, "not a normal group message"),
            Self::GroupNotAllowed(group_id) => write!(f, "group {group_id} is not allowed"),
            Self::MalformedMessage => write!(f, "malformed message body"),
            Self::NotMentioned => write!(f, "bot not mentioned"),
        }
    }
}

/// Gates events before they reach the handler.
///
/// Fails closed: a message body that does not parse is rejected.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    allowlist: GroupAllowlist,
}

impl EventFilter {
    /// Creates a filter over `allowlist`.
    pub fn new(allowlist: GroupAllowlist) -> Self {
        Self { allowlist }
    }

    /// The groups this filter admits.
    pub fn allowlist(&self) -> &GroupAllowlist {
        &self.allowlist
    }

    /// Checks `event`, returning why it should be skipped.
    pub fn check(&self, event: &ChatEvent) -> Result<(), SkipReason> {
        if !event.is_normal_group_message() {
            return Err(SkipReason::NotGroupMessage);
        }
        if !self.allowlist.contains(event.group_id) {
            return Err(SkipReason::GroupNotAllowed(event.group_id));
        }

        let message = event.parse_message().map_err(|e| {
            error!(group_id = event.group_id, error = %e, "Failed to parse message");
            SkipReason::MalformedMessage
        })?;

        if message.mentions(event.self_id) {
            Ok(())
        } else {
            Err(SkipReason::NotMentioned)
        }
    }

    /// Returns true if `event` should be handled.
    pub fn should_handle(&self, event: &ChatEvent) -> bool {
        self.check(event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF_ID: i64 = 10001;
    const GROUP: i64 = 555;

    fn filter() -> EventFilter {
        EventFilter::new([GROUP].into_iter().collect())
    }

    fn event(message: &str) -> ChatEvent {
        ChatEvent {
            post_type: "message".into(),
            message_type: "group".into(),
            sub_type: "normal".into(),
            group_id: GROUP,
            user_id: 42,
            self_id: SELF_ID,
            message: message.into(),
        }
    }

    #[test]
    fn test_accepts_mention() {
        let ev = event("[CQ:at,qq=10001] hello");
        assert_eq!(filter().check(&ev), Ok(()));
        assert!(filter().should_handle(&ev));
    }

    #[test]
    fn test_accepts_mention_anywhere() {
        let ev = event("hey [CQ:face,id=1][CQ:at,qq=999][CQ:at,qq=10001]");
        assert!(filter().should_handle(&ev));
    }

    #[test]
    fn test_rejects_wrong_kinds() {
        for (post, msg, sub) in [
            ("notice", "group", "normal"),
            ("message", "private", "normal"),
            ("message", "group", "anonymous"),
        ] {
            let mut ev = event("[CQ:at,qq=10001]");
            ev.post_type = post.into();
            ev.message_type = msg.into();
            ev.sub_type = sub.into();
            assert_eq!(filter().check(&ev), Err(SkipReason::NotGroupMessage));
        }
    }

    #[test]
    fn test_rejects_group_outside_allowlist() {
        let mut ev = event("[CQ:at,qq=10001]");
        ev.group_id = 1;
        assert_eq!(filter().check(&ev), Err(SkipReason::GroupNotAllowed(1)));
        assert!(!EventFilter::default().should_handle(&event("[CQ:at,qq=10001]")));
    }

    #[test]
    fn test_rejects_without_mention() {
        assert_eq!(
            filter().check(&event("hello [CQ:at,qq=999]")),
            Err(SkipReason::NotMentioned)
        );
        assert_eq!(
            filter().check(&event("[CQ:at,qq=all]")),
            Err(SkipReason::NotMentioned)
        );
    }

    #[test]
    fn test_non_numeric_qq_is_not_a_match() {
        assert_eq!(
            filter().check(&event("[CQ:at,qq=abc]")),
            Err(SkipReason::NotMentioned)
        );
    }

    #[test]
    fn test_mention_compares_numerically() {
        assert!(filter().should_handle(&event("[CQ:at,qq=010001]")));
        assert!(filter().should_handle(&event("[CQ:at,qq=+10001]")));
        assert_eq!(
            filter().check(&event("[CQ:at,qq=100010]")),
            Err(SkipReason::NotMentioned)
        );
    }

    #[test]
    fn test_check_is_repeatable() {
        let filter = filter();
        for message in ["[CQ:at,qq=10001] hi", "hi", "[CQ:at,qq=10001"] {
            let ev = event(message);
            assert_eq!(filter.check(&ev), filter.check(&ev));
        }
        let ev = event("[CQ:at,qq=10001] hi");
        assert!(filter.should_handle(&ev));
        assert!(filter.should_handle(&ev));
    }

    #[test]
    fn test_malformed_body_fails_closed() {
        assert_eq!(
            filter().check(&event("[CQ:at,qq=10001")),
            Err(SkipReason::MalformedMessage)
        );
    }
}
