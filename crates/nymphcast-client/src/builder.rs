//! Controller builder for configuration.

use crate::events::{EventHandler, NoOpHandler};
use crate::transport::Transport;
use crate::Controller;
use nymphcast_content::ContentProvider;
use nymphcast_core::{ConfigError, ControllerConfig, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring a [`Controller`].
///
/// A transport and a content provider are required; everything else has a
/// default.
pub struct ControllerBuilder {
    config: ControllerConfig,
    transport: Option<Arc<dyn Transport>>,
    content_provider: Option<Arc<dyn ContentProvider>>,
    event_handler: Option<Box<dyn EventHandler>>,
}

impl ControllerBuilder {
    /// Create new builder with defaults.
    pub fn new() -> Self {
        Self {
            config: ControllerConfig::default(),
            transport: None,
            content_provider: None,
            event_handler: None,
        }
    }

    /// Start from a TOML configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new().config(ControllerConfig::load(path)?))
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Client id announced to receivers on `start()`.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = Some(id.into());
        self
    }

    /// Mount point of the primary external storage volume.
    pub fn external_storage_root(mut self, root: impl Into<String>) -> Self {
        self.config.external_storage_root = root.into();
        self
    }

    /// How long `discover()` waits for a round.
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.config.discovery_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a transport that is shared with other owners.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn content_provider(mut self, provider: impl ContentProvider + 'static) -> Self {
        self.content_provider = Some(Arc::new(provider));
        self
    }

    pub fn shared_content_provider(mut self, provider: Arc<dyn ContentProvider>) -> Self {
        self.content_provider = Some(provider);
        self
    }

    /// Set event handler.
    pub fn event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.event_handler = Some(Box::new(handler));
        self
    }

    /// Build the controller.
    pub fn build(self) -> Result<Controller> {
        let transport = self
            .transport
            .ok_or(ConfigError::MissingComponent("transport"))?;
        let provider = self
            .content_provider
            .ok_or(ConfigError::MissingComponent("content provider"))?;
        let events = self
            .event_handler
            .unwrap_or_else(|| Box::new(NoOpHandler));

        Ok(Controller::from_parts(self.config, transport, provider, events))
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
