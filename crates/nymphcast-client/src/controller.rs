//! Main controller API.

use crate::builder::ControllerBuilder;
use crate::channel::ApplicationChannel;
use crate::connection::{ConnectFinish, ConnectStep, ConnectTicket};
use crate::discovery::{DiscoveryHandle, DiscoveryManager};
use crate::dispatcher::CastDispatcher;
use crate::events::{ControllerEvent, EventHandler};
use crate::shared::Shared;
use crate::transport::Transport;
use nymphcast_content::{ContentProvider, ContentResolver, MediaLibrary};
use nymphcast_core::{
    CastOutcome, CastSession, ChannelError, ConnectionFailure, ConnectionState, ContentReference,
    ControllerConfig, PlaybackStatus, RemoteDescriptor, RemoteEntry, RemoteId, Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Discovers NymphCast receivers, keeps at most one connected, and casts to it.
///
/// Cheap to clone; clones share the same state. The UI and the transport's
/// notification path may call into it concurrently.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

struct Inner {
    config: ControllerConfig,
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    discovery: DiscoveryManager,
    dispatcher: CastDispatcher,
    channel: ApplicationChannel,
    library: MediaLibrary,
    started: AtomicBool,
}

impl Controller {
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    pub(crate) fn from_parts(
        config: ControllerConfig,
        transport: Arc<dyn Transport>,
        provider: Arc<dyn ContentProvider>,
        events: Box<dyn EventHandler>,
    ) -> Self {
        let shared = Arc::new(Shared::new(events));

        let ingest_shared = Arc::clone(&shared);
        let discovery = DiscoveryManager::new(Arc::new(move |round: u64, descriptors: Vec<RemoteDescriptor>| {
            if ingest_shared.is_closed() {
                debug!("Ignoring discovery round {} after shutdown", round);
                return;
            }
            let events = ingest_shared.lock().replace_remotes(descriptors);
            ingest_shared.emit_all(events);
        }));

        let resolver = ContentResolver::new(Arc::clone(&provider), config.external_storage_root.clone());

        Self {
            inner: Arc::new(Inner {
                dispatcher: CastDispatcher::new(Arc::clone(&shared), Arc::clone(&transport), resolver),
                channel: ApplicationChannel::new(Arc::clone(&shared), Arc::clone(&transport)),
                library: MediaLibrary::new(provider),
                discovery,
                shared,
                transport,
                config,
                started: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Apply startup configuration. Calling it again has no effect.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(id) = &self.inner.config.client_id {
            self.inner.transport.set_client_id(id);
        }
        info!("Controller started");
    }

    /// Disconnect the active remote and stop accepting transport notifications.
    ///
    /// Afterwards connects are refused and playback commands return `false`
    /// without reaching the transport. Casts and application messages fail
    /// for want of a connected remote.
    pub async fn shutdown(&self) {
        self.inner.shared.close();
        let active = self.inner.shared.lock().registry.active();
        if let Some(remote) = active {
            self.disconnect(remote).await;
        }
        info!("Controller shut down");
    }

    pub fn is_running(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst) && !self.inner.shared.is_closed()
    }

    pub fn set_client_id(&self, id: &str) {
        debug!("Setting client id {}", id);
        self.inner.transport.set_client_id(id);
    }

    // --- Discovery ---

    /// Ask the transport for a discovery round. Returns immediately.
    pub fn start_discovery(&self) -> DiscoveryHandle {
        let (sink, handle) = self.inner.discovery.issue();
        self.inner.transport.find_servers(sink);
        handle
    }

    /// Run a discovery round and wait for it with the configured timeout.
    pub async fn discover(&self) -> Result<Vec<RemoteDescriptor>> {
        let timeout = self.inner.config.discovery_timeout();
        Ok(self.start_discovery().wait_timeout(timeout).await?)
    }

    /// Registry snapshot in discovery order.
    pub fn remotes(&self) -> Vec<RemoteEntry> {
        self.inner.shared.lock().registry.list()
    }

    pub fn connection_state(&self, remote: RemoteId) -> Option<ConnectionState> {
        self.inner.shared.lock().registry.state(remote).cloned()
    }

    /// The remote that is currently `Connected`.
    pub fn active_remote(&self) -> Option<RemoteId> {
        self.inner.shared.lock().registry.connected()
    }

    pub fn session(&self) -> Option<CastSession> {
        self.inner.shared.lock().session.clone()
    }

    // --- Connections ---

    /// Connect to `remote`, disconnecting any other active remote first.
    pub async fn connect(&self, remote: RemoteId) -> bool {
        self.try_connect(remote).await.is_ok()
    }

    pub async fn try_connect(&self, remote: RemoteId) -> std::result::Result<(), ConnectionFailure> {
        match self.begin_connect(remote)? {
            Some(ticket) => self.complete_connect(&ticket).await,
            None => Ok(()),
        }
    }

    /// Like [`try_connect`](Self::try_connect), but a remote still
    /// `Connecting` after `timeout` is marked failed.
    ///
    /// The transport calls keep running in the background. If the connect is
    /// accepted after the timeout, the remote is disconnected again.
    pub async fn connect_with_timeout(
        &self,
        remote: RemoteId,
        timeout: Duration,
    ) -> std::result::Result<(), ConnectionFailure> {
        let Some(ticket) = self.begin_connect(remote)? else {
            return Ok(());
        };

        let worker = tokio::spawn({
            let controller = self.clone();
            let ticket = ticket.clone();
            async move { controller.complete_connect(&ticket).await }
        });

        let failure = match tokio::time::timeout(timeout, worker).await {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => {
                warn!("Connect task for {} failed: {}", remote, e);
                ConnectionFailure::new("connect task failed")
            }
            Err(_) => ConnectionFailure::new("connect timed out"),
        };

        let (events, connected) = {
            let mut state = self.inner.shared.lock();
            let events = state.abandon_connect(&ticket, &failure);
            (events, state.is_connected_by(&ticket))
        };
        match events {
            Some(events) => {
                warn!("Connect to {} abandoned: {}", remote, failure.reason);
                self.inner.shared.emit_all(events);
                Err(failure)
            }
            // Finished between the deadline and the lock.
            None if connected => Ok(()),
            None => Err(failure),
        }
    }

    /// `Ok(None)` when the remote is already connected.
    fn begin_connect(&self, remote: RemoteId) -> std::result::Result<Option<ConnectTicket>, ConnectionFailure> {
        // Checked under the lock so `shutdown` either sees this attempt or refuses it.
        let step = {
            let mut state = self.inner.shared.lock();
            if self.inner.shared.is_closed() {
                ConnectStep::Rejected(ConnectionFailure::new("controller is shut down"))
            } else {
                state.begin_connect(remote)
            }
        };
        match step {
            ConnectStep::AlreadyConnected => {
                debug!("{} is already connected", remote);
                Ok(None)
            }
            ConnectStep::Rejected(failure) => {
                warn!("Connect to {} rejected: {}", remote, failure.reason);
                Err(failure)
            }
            ConnectStep::Proceed { ticket, events } => {
                self.inner.shared.emit_all(events);
                Ok(Some(ticket))
            }
        }
    }

    async fn complete_connect(&self, ticket: &ConnectTicket) -> std::result::Result<(), ConnectionFailure> {
        if let Some(evicted) = ticket.evicted {
            if !self.inner.transport.disconnect_server(evicted).await {
                warn!("Transport failed to disconnect evicted remote {}", evicted);
            }
        }

        info!("Connecting to {}", ticket.target);
        let accepted = self.inner.transport.connect_server(ticket.target).await;

        let finish = self.inner.shared.lock().finish_connect(ticket, accepted);
        match finish {
            ConnectFinish::Connected(events) => {
                info!("Connected to {}", ticket.target);
                self.inner.shared.emit_all(events);
                Ok(())
            }
            ConnectFinish::Failed(failure, events) => {
                warn!("Connect to {} failed", ticket.target);
                self.inner.shared.emit_all(events);
                Err(failure)
            }
            ConnectFinish::Superseded => {
                warn!(
                    "Connect result for {} ignored: attempt was superseded",
                    ticket.target
                );
                if accepted {
                    self.tear_down_superseded(ticket.target).await;
                }
                Err(ConnectionFailure::new(format!(
                    "connect to {} was superseded",
                    ticket.target
                )))
            }
        }
    }

    /// The transport accepted a connect nobody is waiting for any more.
    /// Close it unless a newer attempt has since claimed the same remote.
    async fn tear_down_superseded(&self, remote: RemoteId) {
        if self.inner.shared.lock().is_active(remote) {
            debug!("Keeping transport connection to {}: claimed by a newer attempt", remote);
            return;
        }
        info!("Closing superseded connection to {}", remote);
        if !self.inner.transport.disconnect_server(remote).await {
            warn!("Transport failed to close superseded connection to {}", remote);
        }
    }

    /// Disconnect `remote` if it is connected or connecting.
    ///
    /// Always `true`: an inactive remote is a no-op, and transport failures
    /// are logged after the local state has already moved to `Disconnected`.
    pub async fn disconnect(&self, remote: RemoteId) -> bool {
        let events = self.inner.shared.lock().begin_disconnect(remote);
        let Some(events) = events else {
            debug!("Disconnect of {} skipped: not active", remote);
            return true;
        };
        self.inner.shared.emit_all(events);

        info!("Disconnecting from {}", remote);
        if !self.inner.transport.disconnect_server(remote).await {
            warn!("Transport failed to disconnect {}", remote);
        }
        true
    }

    // --- Casting ---

    pub async fn cast_selected(&self, reference: &ContentReference) -> CastOutcome {
        self.inner.dispatcher.cast_selected(reference).await
    }

    pub async fn cast_url(&self, url: &str) -> CastOutcome {
        self.inner.dispatcher.cast_url(url).await
    }

    pub async fn playback_start(&self) -> bool {
        if self.inner.shared.is_closed() {
            debug!("Playback start skipped: controller is shut down");
            return false;
        }
        self.inner.dispatcher.playback_start().await
    }

    pub async fn playback_stop(&self) -> bool {
        if self.inner.shared.is_closed() {
            debug!("Playback stop skipped: controller is shut down");
            return false;
        }
        self.inner.dispatcher.playback_stop().await
    }

    pub fn resolver(&self) -> &ContentResolver {
        self.inner.dispatcher.resolver()
    }

    pub fn media_library(&self) -> &MediaLibrary {
        &self.inner.library
    }

    // --- Applications ---

    pub async fn list_applications(&self) -> std::result::Result<String, ChannelError> {
        self.inner.channel.list_applications().await
    }

    pub async fn send_app_message(&self, app_id: &str, payload: &str) -> std::result::Result<String, ChannelError> {
        self.inner.channel.send_message(app_id, payload).await
    }

    /// Handle for the transport's playback status notifications.
    pub fn status_sink(&self) -> StatusSink {
        StatusSink {
            shared: Arc::clone(&self.inner.shared),
        }
    }
}

/// Receives playback status reports from the native layer.
#[derive(Clone)]
pub struct StatusSink {
    shared: Arc<Shared>,
}

impl StatusSink {
    /// Store `status` on the current session. Dropped when nothing is connected.
    pub fn update(&self, status: PlaybackStatus) {
        if self.shared.is_closed() {
            return;
        }

        let stored = {
            let mut state = self.shared.lock();
            match state.session.as_mut() {
                Some(session) => {
                    session.status = Some(status.clone());
                    true
                }
                None => false,
            }
        };

        if stored {
            self.shared.emit(ControllerEvent::StatusUpdated(status));
        } else {
            debug!("Status update dropped: no session");
        }
    }
}
