//! Plugin lifecycle: load once, then process events.

use std::sync::Arc;

use haruno_onebot::ChatEvent;
use haruno_runtime::HarunoConfig;
use tracing::{debug, info};

use crate::answer::{AnswerProvider, TuringClient};
use crate::config::{PLUGIN_NAME, TuringConfig};
use crate::error::TuringResult;
use crate::filter::EventFilter;
use crate::handler::{Outcome, TuringHandler};
use crate::sender::GroupSender;

/// The Turing chat plugin.
///
/// Built once from configuration and shared across concurrent events.
pub struct Turing {
    name: String,
    filter: EventFilter,
    handler: TuringHandler,
}

impl Turing {
    /// Loads the plugin from the `plugins.turing` section of `config`.
    ///
    /// # Errors
    /// Fails if the section cannot be deserialized, the token is empty, the
    /// API URL is invalid or the HTTP client cannot be built.
    pub fn load(config: &HarunoConfig, sender: Arc<dyn GroupSender>) -> TuringResult<Self> {
        let section: TuringConfig = config.plugin(PLUGIN_NAME)?;
        section.validate()?;
        let client = TuringClient::from_config(&section)?;
        Ok(Self::with_parts(&section, Arc::new(client), sender))
    }

    /// Assembles the plugin from an already validated section and explicit
    /// collaborators.
    pub fn with_parts(
        config: &TuringConfig,
        provider: Arc<dyn AnswerProvider>,
        sender: Arc<dyn GroupSender>,
    ) -> Self {
        let name = config.display_name();
        Self {
            filter: EventFilter::new(config.allowlist()),
            handler: TuringHandler::new(name.clone(), provider, sender),
            name,
        }
    }

    /// `name@version`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logs that the plugin is ready.
    pub fn loaded(&self) {
        info!(
            plugin = %self.name,
            groups = self.filter.allowlist().len(),
            "Plugin loaded"
        );
    }

    /// The event filter.
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Runs `event` through the filter and, if accepted, the handler.
    pub async fn process(&self, event: &ChatEvent) -> Outcome {
        if let Err(reason) = self.filter.check(event) {
            debug!(plugin = %self.name, %reason, "Skipped event");
            return Outcome::Skipped(reason);
        }
        self.handler.handle(event).await
    }
}
