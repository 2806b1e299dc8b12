//! In-process fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nymphcast_client::{
    ContentProvider, ContentReference, Cursor, DiscoverySink, ProviderError, Query, RemoteId, Transport,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A transport call as observed by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindServers,
    ClientId(String),
    Connect(RemoteId),
    Disconnect(RemoteId),
    CastFile(String),
    CastUrl(String),
    PlaybackStart,
    PlaybackStop,
    ListApplications,
    AppMessage(String, String),
}

/// Scriptable transport.
///
/// Discovery answers immediately with the configured names, or parks the
/// sink when none are configured. Connects succeed unless refused, and can
/// be held until released. Calls are logged when they start; the set of
/// open connections changes when they finish.
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    round: Mutex<Option<Vec<String>>>,
    parked: Mutex<Vec<DiscoverySink>>,
    refused: Mutex<HashSet<RemoteId>>,
    gates: Mutex<HashMap<RemoteId, Arc<Notify>>>,
    reject_casts: Mutex<bool>,
    open: Mutex<BTreeSet<RemoteId>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(names: &[&str]) -> Self {
        let transport = Self::new();
        transport.set_round(names);
        transport
    }

    pub fn set_round(&self, names: &[&str]) {
        *self.round.lock().unwrap() = Some(names.iter().map(|n| n.to_string()).collect());
    }

    /// Stop answering discovery; later sinks are parked.
    pub fn park_rounds(&self) {
        *self.round.lock().unwrap() = None;
    }

    pub fn take_parked(&self) -> Vec<DiscoverySink> {
        std::mem::take(&mut *self.parked.lock().unwrap())
    }

    pub fn refuse(&self, remote: RemoteId) {
        self.refused.lock().unwrap().insert(remote);
    }

    pub fn reject_casts(&self) {
        *self.reject_casts.lock().unwrap() = true;
    }

    /// Hold connects to `remote` until the returned gate is notified.
    pub fn hold_connect(&self, remote: RemoteId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(remote, Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Remotes the transport currently holds a connection to.
    pub fn open_connections(&self) -> Vec<RemoteId> {
        self.open.lock().unwrap().iter().copied().collect()
    }

    pub fn count(&self, wanted: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| wanted(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn casts_accepted(&self) -> bool {
        !*self.reject_casts.lock().unwrap()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn find_servers(&self, sink: DiscoverySink) {
        self.record(Call::FindServers);
        let round = self.round.lock().unwrap().clone();
        match round {
            Some(names) => sink.deliver_names(names),
            None => self.parked.lock().unwrap().push(sink),
        }
    }

    fn set_client_id(&self, id: &str) {
        self.record(Call::ClientId(id.to_string()));
    }

    async fn connect_server(&self, id: RemoteId) -> bool {
        self.record(Call::Connect(id));
        let gate = self.gates.lock().unwrap().get(&id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let accepted = !self.refused.lock().unwrap().contains(&id);
        if accepted {
            self.open.lock().unwrap().insert(id);
        }
        accepted
    }

    async fn disconnect_server(&self, id: RemoteId) -> bool {
        self.record(Call::Disconnect(id));
        self.open.lock().unwrap().remove(&id);
        true
    }

    async fn cast_file(&self, path: String) -> bool {
        self.record(Call::CastFile(path));
        self.casts_accepted()
    }

    async fn cast_url(&self, url: String) -> bool {
        self.record(Call::CastUrl(url));
        self.casts_accepted()
    }

    async fn playback_start(&self) -> bool {
        self.record(Call::PlaybackStart);
        true
    }

    async fn playback_stop(&self) -> bool {
        self.record(Call::PlaybackStop);
        true
    }

    async fn list_applications(&self) -> String {
        self.record(Call::ListApplications);
        "SoundCloud\nYouTube".to_string()
    }

    async fn send_app_message(&self, app_id: String, payload: String) -> String {
        self.record(Call::AppMessage(app_id.clone(), payload.clone()));
        format!("{} <- {}", app_id, payload)
    }
}

/// Content provider backed by in-memory tables keyed by reference.
#[derive(Default)]
pub struct MemoryProvider {
    tables: HashMap<String, (Vec<String>, Vec<Vec<Option<String>>>)>,
    queries: AtomicUsize,
    open: Arc<AtomicUsize>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, reference: &ContentReference, columns: &[&str], rows: &[&[Option<&str>]]) -> Self {
        self.tables.insert(
            reference.to_string(),
            (
                columns.iter().map(|c| c.to_string()).collect(),
                rows.iter()
                    .map(|row| row.iter().map(|v| v.map(str::to_string)).collect())
                    .collect(),
            ),
        );
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Cursors handed out and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl ContentProvider for MemoryProvider {
    fn query(&self, query: &Query) -> Result<Option<Box<dyn Cursor>>, ProviderError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let Some((columns, rows)) = self.tables.get(&query.reference.to_string()) else {
            return Ok(None);
        };

        let id_index = columns.iter().position(|c| c == "_id");
        let rows = rows
            .iter()
            .filter(|row| match (query.selection.as_deref(), id_index) {
                (Some("_id=?"), Some(index)) => row[index].as_deref() == query.selection_args.first().map(String::as_str),
                _ => true,
            })
            .cloned()
            .collect();

        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Box::new(MemoryCursor {
            columns: columns.clone(),
            rows,
            next: 0,
            open: Arc::clone(&self.open),
            closed: false,
        })))
    }
}

struct MemoryCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    next: usize,
    open: Arc<AtomicUsize>,
    closed: bool,
}

impl MemoryCursor {
    fn current(&self) -> Option<&Vec<Option<String>>> {
        self.next.checked_sub(1).and_then(|i| self.rows.get(i))
    }
}

impl Cursor for MemoryCursor {
    fn move_to_next(&mut self) -> bool {
        self.next += 1;
        self.next <= self.rows.len()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    fn get_string(&self, index: usize) -> Option<String> {
        self.current()?.get(index)?.clone()
    }

    fn get_long(&self, index: usize) -> Option<i64> {
        self.get_string(index)?.parse().ok()
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
