//! Connection state machine over the remote registry.
//!
//! `Disconnected → Connecting → {Connected, Failed} → Disconnected`, with at
//! most one remote `Connecting` or `Connected` at any time. The transitions
//! here are synchronous and run under the controller's lock; the controller
//! performs the transport calls between `begin_connect` and `finish_connect`
//! with the lock released.

use crate::events::ControllerEvent;
use crate::registry::RemoteRegistry;
use nymphcast_core::{CastSession, ConnectionFailure, ConnectionState, RemoteDescriptor, RemoteId};
use tracing::{debug, info};

/// Registry plus the session bound to its connected remote.
#[derive(Debug, Default)]
pub(crate) struct ControllerState {
    pub(crate) registry: RemoteRegistry,
    pub(crate) session: Option<CastSession>,
    next_attempt: u64,
}

/// Outcome of the synchronous half of `connect`.
#[derive(Debug)]
pub(crate) enum ConnectStep {
    /// Target is already `Connected`; nothing to do.
    AlreadyConnected,
    /// Target cannot be connected right now.
    Rejected(ConnectionFailure),
    /// Target is now `Connecting`; run the transport calls.
    Proceed {
        ticket: ConnectTicket,
        events: Vec<ControllerEvent>,
    },
}

/// Identifies one connect attempt so a late result can be recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConnectTicket {
    pub(crate) target: RemoteId,
    /// Remote forced to `Disconnected` to make room for the target.
    pub(crate) evicted: Option<RemoteId>,
    generation: u64,
    attempt: u64,
}

/// Outcome of the asynchronous half of `connect`.
#[derive(Debug, PartialEq)]
pub(crate) enum ConnectFinish {
    Connected(Vec<ControllerEvent>),
    Failed(ConnectionFailure, Vec<ControllerEvent>),
    /// The attempt was overtaken by a disconnect, eviction, or new round.
    Superseded,
}

impl ControllerState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Ingest a discovery round. Any session is dropped with the old set.
    pub(crate) fn replace_remotes(&mut self, descriptors: Vec<RemoteDescriptor>) -> Vec<ControllerEvent> {
        if let Some(session) = self.session.take() {
            info!("Discovery round replaced connected remote {}", session.remote);
        }
        self.registry.replace_all(descriptors);
        vec![ControllerEvent::RemotesUpdated(self.registry.list())]
    }

    /// Validate the target, evict any other active remote and mark the
    /// target `Connecting`, all in one critical section.
    pub(crate) fn begin_connect(&mut self, target: RemoteId) -> ConnectStep {
        match self.registry.state(target) {
            None => {
                return ConnectStep::Rejected(ConnectionFailure::new(format!(
                    "unknown remote {}",
                    target
                )))
            }
            Some(ConnectionState::Connected) => return ConnectStep::AlreadyConnected,
            Some(ConnectionState::Connecting) => {
                return ConnectStep::Rejected(ConnectionFailure::new(format!(
                    "connect to {} already in progress",
                    target
                )))
            }
            Some(_) => {}
        }

        let mut events = Vec::new();

        let evicted = self.registry.active();
        if let Some(old) = evicted {
            debug!("Evicting {} before connecting {}", old, target);
            events.extend(self.release(old));
        }

        self.next_attempt += 1;
        let attempt = self.next_attempt;
        self.registry.set_state(target, ConnectionState::Connecting);
        self.registry.set_attempt(target, attempt);
        events.push(ControllerEvent::ConnectionChanged {
            remote: target,
            state: ConnectionState::Connecting,
        });

        ConnectStep::Proceed {
            ticket: ConnectTicket {
                target,
                evicted,
                generation: self.registry.generation(),
                attempt,
            },
            events,
        }
    }

    /// Apply the transport's connect result, unless the attempt is stale.
    pub(crate) fn finish_connect(&mut self, ticket: &ConnectTicket, accepted: bool) -> ConnectFinish {
        if !self.is_current(ticket) {
            return ConnectFinish::Superseded;
        }

        if accepted {
            self.registry.set_state(ticket.target, ConnectionState::Connected);
            self.session = Some(CastSession::new(ticket.target));
            ConnectFinish::Connected(vec![ControllerEvent::ConnectionChanged {
                remote: ticket.target,
                state: ConnectionState::Connected,
            }])
        } else {
            let failure = ConnectionFailure::new(format!("transport refused connection to {}", ticket.target));
            let events = self.fail(ticket.target, &failure);
            ConnectFinish::Failed(failure, events)
        }
    }

    /// Force a still-pending attempt to `Failed`, e.g. after a caller timeout.
    pub(crate) fn abandon_connect(
        &mut self,
        ticket: &ConnectTicket,
        failure: &ConnectionFailure,
    ) -> Option<Vec<ControllerEvent>> {
        if self.is_current(ticket) {
            Some(self.fail(ticket.target, failure))
        } else {
            None
        }
    }

    /// Move an active remote to `Disconnected`. `None` if it was not active.
    pub(crate) fn begin_disconnect(&mut self, remote: RemoteId) -> Option<Vec<ControllerEvent>> {
        match self.registry.state(remote) {
            Some(state) if state.is_active() => Some(self.release(remote)),
            _ => None,
        }
    }

    fn release(&mut self, remote: RemoteId) -> Vec<ControllerEvent> {
        self.registry.set_state(remote, ConnectionState::Disconnected);
        if self.session.as_ref().map(|s| s.remote) == Some(remote) {
            self.session = None;
        }
        vec![ControllerEvent::ConnectionChanged {
            remote,
            state: ConnectionState::Disconnected,
        }]
    }

    fn fail(&mut self, remote: RemoteId, failure: &ConnectionFailure) -> Vec<ControllerEvent> {
        let state = ConnectionState::Failed(failure.reason.clone());
        self.registry.set_state(remote, state.clone());
        vec![ControllerEvent::ConnectionChanged { remote, state }]
    }

    /// True when the attempt behind `ticket` already reached `Connected`.
    pub(crate) fn is_connected_by(&self, ticket: &ConnectTicket) -> bool {
        self.registry.generation() == ticket.generation
            && self.registry.state(ticket.target) == Some(&ConnectionState::Connected)
            && self.registry.attempt(ticket.target) == Some(ticket.attempt)
    }

    /// True while `remote` is `Connecting` or `Connected` in the current set.
    pub(crate) fn is_active(&self, remote: RemoteId) -> bool {
        self.registry.state(remote).map_or(false, ConnectionState::is_active)
    }

    fn is_current(&self, ticket: &ConnectTicket) -> bool {
        self.registry.generation() == ticket.generation
            && self.registry.state(ticket.target) == Some(&ConnectionState::Connecting)
            && self.registry.attempt(ticket.target) == Some(ticket.attempt)
    }
}
