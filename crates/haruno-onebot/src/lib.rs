//! # haruno-onebot
//!
//! OneBot v11 message model and inbound event shape used by the haruno bot.
//!
//! ## Overview
//!
//! - [`Segment`]: one tagged unit of a message (`text`, `at`, `face`, ...)
//! - [`Message`]: an ordered list of segments, with CQ code string and JSON
//!   array codecs
//! - [`ChatEvent`]: the fields of an inbound event the reply pipeline needs
//!
//! ## Quick Start
//!
//! ```rust
//! use haruno_onebot::{ChatEvent, Message};
//!
//! let event = ChatEvent::from_json(
//!     r#"{"post_type":"message","message_type":"group","sub_type":"normal",
//!         "group_id":1,"user_id":2,"self_id":3,"message":"[CQ:at,qq=3]hi"}"#,
//! )
//! .unwrap();
//!
//! let msg: Message = event.parse_message().unwrap();
//! assert!(msg.mentions(event.self_id));
//! ```

pub mod error;
pub mod event;
pub mod message;
pub mod segment;

pub use error::{ParseError, ParseResult};
pub use event::{ChatEvent, MESSAGE_TYPE_GROUP, POST_TYPE_MESSAGE, SUB_TYPE_NORMAL};
pub use message::{Message, parse_cq_string};
pub use segment::{
    AtTarget, Segment, escape_cq_text, escape_cq_value, unescape_cq_text, unescape_cq_value,
};
