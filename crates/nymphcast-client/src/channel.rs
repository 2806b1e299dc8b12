//! Request/response messaging with applications on the connected receiver.

use crate::shared::Shared;
use crate::transport::Transport;
use nymphcast_core::ChannelError;
use std::sync::Arc;
use tracing::debug;

/// Opaque pass-through to receiver applications. Payloads are not parsed.
pub(crate) struct ApplicationChannel {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
}

impl ApplicationChannel {
    pub(crate) fn new(shared: Arc<Shared>, transport: Arc<dyn Transport>) -> Self {
        Self { shared, transport }
    }

    pub(crate) async fn list_applications(&self) -> Result<String, ChannelError> {
        self.ensure_connected()?;
        Ok(self.transport.list_applications().await)
    }

    pub(crate) async fn send_message(&self, app_id: &str, payload: &str) -> Result<String, ChannelError> {
        self.ensure_connected()?;
        debug!("Sending {} bytes to application {}", payload.len(), app_id);
        Ok(self
            .transport
            .send_app_message(app_id.to_string(), payload.to_string())
            .await)
    }

    fn ensure_connected(&self) -> Result<(), ChannelError> {
        match self.shared.lock().registry.connected() {
            Some(_) => Ok(()),
            None => Err(ChannelError::NotConnected),
        }
    }
}
