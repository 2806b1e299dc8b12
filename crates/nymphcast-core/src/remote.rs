//! Remote receiver representation and connection states.

use std::fmt;

/// Ordinal index of a remote within the discovery round that reported it.
///
/// Ids are only meaningful within one round: the same id in a later round
/// may name a different physical receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemoteId(pub u32);

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A discovered NymphCast receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub id: RemoteId,
    pub display_name: String,
}

impl RemoteDescriptor {
    pub fn new(id: RemoteId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Build descriptors from the names of one discovery round, assigning
    /// ids by report order.
    pub fn from_names<I, S>(names: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Self::new(RemoteId(index as u32), name))
            .collect()
    }
}

/// Connection lifecycle of a single remote.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed(String),
}

impl ConnectionState {
    /// Whether this state counts towards the single-active-connection rule.
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Connected => f.write_str("connected"),
            ConnectionState::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// Snapshot of one registry row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub descriptor: RemoteDescriptor,
    pub state: ConnectionState,
}
