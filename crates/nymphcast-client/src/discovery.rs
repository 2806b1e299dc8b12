//! Discovery rounds: one-shot sinks handed to the transport and the handles
//! callers wait on.

use nymphcast_core::{DiscoveryError, RemoteDescriptor};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Receives every delivered round, in delivery order.
pub(crate) type Ingest = Arc<dyn Fn(u64, Vec<RemoteDescriptor>) + Send + Sync>;

/// Issues numbered discovery rounds.
pub(crate) struct DiscoveryManager {
    next_round: AtomicU64,
    ingest: Ingest,
}

impl DiscoveryManager {
    pub(crate) fn new(ingest: Ingest) -> Self {
        Self {
            next_round: AtomicU64::new(1),
            ingest,
        }
    }

    /// Create the sink for the transport and the handle for the caller.
    pub(crate) fn issue(&self) -> (DiscoverySink, DiscoveryHandle) {
        let round = self.next_round.fetch_add(1, Ordering::Relaxed);
        let (reply, receiver) = oneshot::channel();
        debug!("Issuing discovery round {}", round);
        (
            DiscoverySink {
                round,
                ingest: Arc::clone(&self.ingest),
                reply,
            },
            DiscoveryHandle { round, receiver },
        )
    }
}

/// Where the transport reports the result of one discovery round.
///
/// Consumed on delivery. Dropping it undelivered abandons the round.
pub struct DiscoverySink {
    round: u64,
    ingest: Ingest,
    reply: oneshot::Sender<Vec<RemoteDescriptor>>,
}

impl DiscoverySink {
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Replace the registry with `descriptors` and resolve the waiting handle.
    ///
    /// The most recently delivered round wins, whatever order rounds were
    /// issued in.
    pub fn deliver(self, descriptors: Vec<RemoteDescriptor>) {
        debug!(
            "Discovery round {} delivered {} remotes",
            self.round,
            descriptors.len()
        );
        (self.ingest)(self.round, descriptors.clone());
        // The caller may have stopped waiting; the registry is updated anyway.
        let _ = self.reply.send(descriptors);
    }

    /// Deliver a round given only receiver names, assigning ids in order.
    pub fn deliver_names<I, S>(self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deliver(RemoteDescriptor::from_names(names));
    }
}

impl fmt::Debug for DiscoverySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoverySink")
            .field("round", &self.round)
            .finish_non_exhaustive()
    }
}

/// Caller side of a discovery round.
#[derive(Debug)]
pub struct DiscoveryHandle {
    round: u64,
    receiver: oneshot::Receiver<Vec<RemoteDescriptor>>,
}

impl DiscoveryHandle {
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Wait for the transport to deliver this round.
    pub async fn wait(self) -> Result<Vec<RemoteDescriptor>, DiscoveryError> {
        self.receiver.await.map_err(|_| DiscoveryError::Abandoned)
    }

    /// Wait at most `timeout` for this round.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<Vec<RemoteDescriptor>, DiscoveryError> {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(descriptors)) => Ok(descriptors),
            Ok(Err(_)) => Err(DiscoveryError::Abandoned),
            Err(_) => Err(DiscoveryError::Timeout),
        }
    }
}
