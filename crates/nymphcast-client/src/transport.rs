//! Transport abstraction over the native NymphCast client library.

use crate::discovery::DiscoverySink;
use async_trait::async_trait;
use nymphcast_core::RemoteId;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{trace, warn};

/// Operations the controller needs from the native client.
///
/// Every call may block on the network; the controller never holds its
/// state lock while one is in flight.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Start a discovery round. Returns immediately; results go to `sink`.
    fn find_servers(&self, sink: DiscoverySink);

    /// Set the identifier this client announces to receivers.
    fn set_client_id(&self, id: &str);

    async fn connect_server(&self, id: RemoteId) -> bool;

    async fn disconnect_server(&self, id: RemoteId) -> bool;

    async fn cast_file(&self, path: String) -> bool;

    async fn cast_url(&self, url: String) -> bool;

    async fn playback_start(&self) -> bool;

    async fn playback_stop(&self) -> bool;

    /// Opaque application list as returned by the receiver.
    async fn list_applications(&self) -> String;

    async fn send_app_message(&self, app_id: String, payload: String) -> String;
}

/// Synchronous surface of a native (JNI-style) binding.
pub trait NativeBinding: Send + Sync + 'static {
    /// Blocking server scan. Returns receiver names in report order.
    fn find_servers(&self) -> Vec<String>;

    fn set_client_id(&self, id: &str);

    fn connect_server(&self, id: RemoteId) -> bool;

    fn disconnect_server(&self, id: RemoteId) -> bool;

    fn cast_file(&self, path: &str) -> bool;

    fn cast_url(&self, url: &str) -> bool;

    fn playback_start(&self) -> bool;

    fn playback_stop(&self) -> bool;

    fn list_applications(&self) -> String;

    fn send_app_message(&self, app_id: &str, payload: &str) -> String;
}

/// Adapts a blocking [`NativeBinding`] to [`Transport`] by running each call
/// on tokio's blocking pool.
pub struct BlockingTransport<B> {
    binding: Arc<B>,
}

impl<B: NativeBinding> BlockingTransport<B> {
    pub fn new(binding: B) -> Self {
        Self {
            binding: Arc::new(binding),
        }
    }

    pub fn from_arc(binding: Arc<B>) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &Arc<B> {
        &self.binding
    }

    async fn call<T, F>(&self, op: &'static str, f: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(&B) -> T + Send + 'static,
    {
        let binding = Arc::clone(&self.binding);
        trace!("Native call {}", op);
        match tokio::task::spawn_blocking(move || f(&binding)).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Native call {} did not complete: {}", op, e);
                T::default()
            }
        }
    }
}

#[async_trait]
impl<B: NativeBinding> Transport for BlockingTransport<B> {
    fn find_servers(&self, sink: DiscoverySink) {
        let binding = Arc::clone(&self.binding);
        let scan = move || sink.deliver_names(binding.find_servers());
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(scan);
            }
            Err(_) => {
                std::thread::spawn(scan);
            }
        }
    }

    fn set_client_id(&self, id: &str) {
        self.binding.set_client_id(id);
    }

    async fn connect_server(&self, id: RemoteId) -> bool {
        self.call("connect_server", move |b| b.connect_server(id)).await
    }

    async fn disconnect_server(&self, id: RemoteId) -> bool {
        self.call("disconnect_server", move |b| b.disconnect_server(id)).await
    }

    async fn cast_file(&self, path: String) -> bool {
        self.call("cast_file", move |b| b.cast_file(&path)).await
    }

    async fn cast_url(&self, url: String) -> bool {
        self.call("cast_url", move |b| b.cast_url(&url)).await
    }

    async fn playback_start(&self) -> bool {
        self.call("playback_start", |b| b.playback_start()).await
    }

    async fn playback_stop(&self) -> bool {
        self.call("playback_stop", |b| b.playback_stop()).await
    }

    async fn list_applications(&self) -> String {
        self.call("list_applications", |b| b.list_applications()).await
    }

    async fn send_app_message(&self, app_id: String, payload: String) -> String {
        self.call("send_app_message", move |b| b.send_app_message(&app_id, &payload))
            .await
    }
}
