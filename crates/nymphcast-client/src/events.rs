//! Controller events and handlers.

use nymphcast_core::{CastCommand, ConnectionState, PlaybackStatus, RemoteEntry, RemoteId};
use tokio::sync::mpsc;

/// Events emitted by the controller.
///
/// Emitted after the state lock is released, from whichever context caused
/// the change (UI call or transport notification).
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A discovery round replaced the remote list.
    RemotesUpdated(Vec<RemoteEntry>),
    /// A remote changed connection state.
    ConnectionChanged {
        remote: RemoteId,
        state: ConnectionState,
    },
    /// A cast or playback command went to the transport.
    CommandSent { command: CastCommand, accepted: bool },
    /// The receiver reported playback status.
    StatusUpdated(PlaybackStatus),
}

/// Handler for controller events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs. Must not block.
    fn on_event(&self, event: ControllerEvent);
}

/// No-op event handler.
pub struct NoOpHandler;

impl EventHandler for NoOpHandler {
    fn on_event(&self, _event: ControllerEvent) {}
}

/// Callback-based event handler.
pub struct CallbackHandler<F>
where
    F: Fn(ControllerEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(ControllerEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(ControllerEvent) + Send + Sync,
{
    fn on_event(&self, event: ControllerEvent) {
        (self.callback)(event);
    }
}

/// Forwards events into an unbounded channel, for consumers that prefer a
/// stream.
pub struct ChannelHandler {
    sender: mpsc::UnboundedSender<ControllerEvent>,
}

impl ChannelHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventHandler for ChannelHandler {
    fn on_event(&self, event: ControllerEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.sender.send(event);
    }
}
