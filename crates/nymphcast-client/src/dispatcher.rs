//! Cast and playback commands against the connected remote.

use crate::events::ControllerEvent;
use crate::shared::Shared;
use crate::transport::Transport;
use nymphcast_content::ContentResolver;
use nymphcast_core::{CastCommand, CastOutcome, ContentReference, RemoteId};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub(crate) struct CastDispatcher {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    resolver: ContentResolver,
}

impl CastDispatcher {
    pub(crate) fn new(shared: Arc<Shared>, transport: Arc<dyn Transport>, resolver: ContentResolver) -> Self {
        Self {
            shared,
            transport,
            resolver,
        }
    }

    pub(crate) fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    /// Resolve a locally selected item and cast it to the connected remote.
    pub(crate) async fn cast_selected(&self, reference: &ContentReference) -> CastOutcome {
        let Some(remote) = self.connected() else {
            debug!("Cast of {} skipped: no connected remote", reference);
            return CastOutcome::NoActiveConnection;
        };

        let media = match self.resolver.resolve(reference) {
            Ok(media) => media,
            Err(e) => {
                warn!("Cannot cast {}: {}", reference, e);
                return CastOutcome::UnresolvedMedia(e);
            }
        };

        info!("Casting {} to {}", media.absolute_path, remote);
        let accepted = self.transport.cast_file(media.absolute_path).await;
        self.record(Some(remote), CastCommand::CastFile, accepted);
        CastOutcome::from_transport(accepted)
    }

    pub(crate) async fn cast_url(&self, url: &str) -> CastOutcome {
        let Some(remote) = self.connected() else {
            debug!("Cast of {} skipped: no connected remote", url);
            return CastOutcome::NoActiveConnection;
        };

        info!("Casting URL {} to {}", url, remote);
        let accepted = self.transport.cast_url(url.to_string()).await;
        self.record(Some(remote), CastCommand::CastUrl, accepted);
        CastOutcome::from_transport(accepted)
    }

    /// Pass-through; the receiver decides what to do without a connection.
    pub(crate) async fn playback_start(&self) -> bool {
        let accepted = self.transport.playback_start().await;
        self.record(None, CastCommand::PlaybackStart, accepted);
        accepted
    }

    pub(crate) async fn playback_stop(&self) -> bool {
        let accepted = self.transport.playback_stop().await;
        self.record(None, CastCommand::PlaybackStop, accepted);
        accepted
    }

    fn connected(&self) -> Option<RemoteId> {
        self.shared.lock().registry.connected()
    }

    /// Store the result on the session. A cast only lands on the session of
    /// the remote it was sent to.
    fn record(&self, target: Option<RemoteId>, command: CastCommand, accepted: bool) {
        {
            let mut state = self.shared.lock();
            if let Some(session) = state.session.as_mut() {
                if target.map_or(true, |remote| remote == session.remote) {
                    session.record(command, accepted);
                }
            }
        }
        if !accepted {
            warn!("Receiver rejected {:?}", command);
        }
        self.shared.emit(ControllerEvent::CommandSent { command, accepted });
    }
}
