//! Cast commands, outcomes, and per-connection session state.

use crate::error::ResolutionError;
use crate::remote::RemoteId;

/// Commands dispatched to the active receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastCommand {
    CastFile,
    CastUrl,
    PlaybackStart,
    PlaybackStop,
}

/// Result of a cast request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    /// No remote is connected; the transport was not contacted.
    NoActiveConnection,
    /// The content reference could not be resolved to a path.
    UnresolvedMedia(ResolutionError),
    /// The transport reported failure.
    TransportRejected,
    /// The transport accepted the command.
    Sent,
}

impl CastOutcome {
    pub fn from_transport(accepted: bool) -> Self {
        if accepted {
            CastOutcome::Sent
        } else {
            CastOutcome::TransportRejected
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, CastOutcome::Sent)
    }
}

/// Playback status as reported by the receiver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackStatus {
    pub playing: bool,
    /// Position in seconds.
    pub position: f64,
    /// Duration in seconds, zero when unknown.
    pub duration: f64,
    /// Volume, 0-128 as used by the receiver.
    pub volume: u8,
}

impl PlaybackStatus {
    /// Get progress percentage (0.0 to 100.0).
    pub fn progress_percentage(&self) -> Option<f32> {
        if self.duration > 0.0 {
            Some((self.position / self.duration * 100.0) as f32)
        } else {
            None
        }
    }

    /// Get remaining time in seconds.
    pub fn remaining(&self) -> Option<f64> {
        if self.duration > 0.0 {
            Some((self.duration - self.position).max(0.0))
        } else {
            None
        }
    }
}

/// State bound to the single connected remote.
#[derive(Debug, Clone, PartialEq)]
pub struct CastSession {
    pub remote: RemoteId,
    pub last_command: Option<CastCommand>,
    pub last_result: bool,
    pub status: Option<PlaybackStatus>,
}

impl CastSession {
    pub fn new(remote: RemoteId) -> Self {
        Self {
            remote,
            last_command: None,
            last_result: false,
            status: None,
        }
    }

    pub fn record(&mut self, command: CastCommand, accepted: bool) {
        self.last_command = Some(command);
        self.last_result = accepted;
    }
}
