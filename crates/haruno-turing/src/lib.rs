//! haruno turing: a group chat plugin that answers when the bot is
//! mentioned.
//!
//! Events pass through an [`EventFilter`] (normal group message, allowed
//! group, bot mentioned). Accepted events go to the [`TuringHandler`],
//! which asks the [`AnswerProvider`] and posts `@sender answer` back to the
//! group through a [`GroupSender`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use haruno_runtime::ConfigLoader;
//! use haruno_turing::Turing;
//!
//! let config = ConfigLoader::new().load()?;
//! let turing = Turing::load(&config, Arc::new(my_sender))?;
//! turing.loaded();
//!
//! let outcome = turing.process(&event).await;
//! ```

pub mod answer;
pub mod config;
pub mod error;
pub mod filter;
pub mod handler;
pub mod plugin;
pub mod reply;
pub mod sender;

pub use answer::{AnswerProvider, AnswerResult, SUCCESS_CODE, TuringClient};
pub use config::{DEFAULT_API_URL, GroupAllowlist, TuringConfig};
pub use error::{TransportError, TransportResult, TuringError, TuringResult};
pub use filter::{EventFilter, SkipReason};
pub use handler::{AbortReason, Outcome, Reply, TuringHandler, extract_question};
pub use plugin::Turing;
pub use reply::{UNHEARD_TEXT, UNKNOWN_ANSWER_TEXT, answer_reply, compose_reply, unheard_reply};
pub use sender::GroupSender;
