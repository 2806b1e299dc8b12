//! The controller's single lock and event fan-out.

use crate::connection::ControllerState;
use crate::events::{ControllerEvent, EventHandler};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutable controller state plus the handler its changes are reported to.
///
/// Every read or write of the registry and session goes through `lock()`.
/// Guards are never held across an `.await`, and events are emitted only
/// after the guard is dropped.
pub(crate) struct Shared {
    state: Mutex<ControllerState>,
    events: Box<dyn EventHandler>,
    /// Set on shutdown; transport notifications arriving later are dropped.
    closed: AtomicBool,
}

impl Shared {
    pub(crate) fn new(events: Box<dyn EventHandler>) -> Self {
        Self {
            state: Mutex::new(ControllerState::new()),
            events,
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn emit(&self, event: ControllerEvent) {
        self.events.on_event(event);
    }

    pub(crate) fn emit_all(&self, events: Vec<ControllerEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
