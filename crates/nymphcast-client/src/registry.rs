//! Registry of discovered remotes and their connection states.

use nymphcast_core::{ConnectionState, RemoteDescriptor, RemoteEntry, RemoteId};
use tracing::debug;

#[derive(Debug, Clone)]
struct Slot {
    descriptor: RemoteDescriptor,
    state: ConnectionState,
    /// Connect attempt that last moved this slot to `Connecting`.
    attempt: u64,
}

/// The set of remotes reported by the latest discovery round.
///
/// Entries keep discovery-report order. The registry itself is not
/// synchronised; the controller keeps it behind its single state lock.
#[derive(Debug, Default)]
pub struct RemoteRegistry {
    slots: Vec<Slot>,
    generation: u64,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every descriptor and reset all states to `Disconnected`.
    ///
    /// Ids reused by the new round are not treated as the same device.
    pub fn replace_all(&mut self, descriptors: Vec<RemoteDescriptor>) {
        self.generation += 1;
        self.slots = descriptors
            .into_iter()
            .map(|descriptor| Slot {
                descriptor,
                state: ConnectionState::Disconnected,
                attempt: 0,
            })
            .collect();
        debug!(
            "Registry generation {} holds {} remotes",
            self.generation,
            self.slots.len()
        );
    }

    /// Snapshot of all entries in discovery order.
    pub fn list(&self) -> Vec<RemoteEntry> {
        self.slots
            .iter()
            .map(|slot| RemoteEntry {
                descriptor: slot.descriptor.clone(),
                state: slot.state.clone(),
            })
            .collect()
    }

    pub fn get(&self, id: RemoteId) -> Option<RemoteEntry> {
        self.slot(id).map(|slot| RemoteEntry {
            descriptor: slot.descriptor.clone(),
            state: slot.state.clone(),
        })
    }

    pub fn state(&self, id: RemoteId) -> Option<&ConnectionState> {
        self.slot(id).map(|slot| &slot.state)
    }

    /// The remote that is `Connected` or `Connecting`, if any.
    pub fn active(&self) -> Option<RemoteId> {
        self.slots
            .iter()
            .find(|slot| slot.state.is_active())
            .map(|slot| slot.descriptor.id)
    }

    /// The remote that is `Connected`, if any.
    pub fn connected(&self) -> Option<RemoteId> {
        self.slots
            .iter()
            .find(|slot| slot.state.is_connected())
            .map(|slot| slot.descriptor.id)
    }

    /// Number of replacements so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn set_state(&mut self, id: RemoteId, state: ConnectionState) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.state = state;
                true
            }
            None => false,
        }
    }

    pub(crate) fn attempt(&self, id: RemoteId) -> Option<u64> {
        self.slot(id).map(|slot| slot.attempt)
    }

    pub(crate) fn set_attempt(&mut self, id: RemoteId, attempt: u64) {
        if let Some(slot) = self.slot_mut(id) {
            slot.attempt = attempt;
        }
    }

    fn slot(&self, id: RemoteId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.descriptor.id == id)
    }

    fn slot_mut(&mut self, id: RemoteId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.descriptor.id == id)
    }
}
