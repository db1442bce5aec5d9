//! In-process store
//!
//! A keyspace of JSON documents behind a RwLock, reachable through the
//! `Transport` trait exactly like a remote store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::{JsonKvError, Result};
use crate::protocol::Reply;
use crate::transport::{BatchReply, Transport};
use super::exec;

/// A stored document and its optional deadline
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub doc: Value,
    pub expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// All documents, keyed by name
///
/// Expired keys are invisible to reads and dropped on the next write.
#[derive(Debug, Clone, Default)]
pub(crate) struct Keyspace {
    entries: BTreeMap<String, Entry>,
}

impl Keyspace {
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key).filter(|e| !e.is_expired(Instant::now()))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.purge_if_expired(key);
        self.entries.get_mut(key)
    }

    pub fn doc(&self, key: &str) -> Option<&Value> {
        self.get(key).map(|e| &e.doc)
    }

    pub fn doc_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.get_mut(key).map(|e| &mut e.doc)
    }

    /// Create a new document without an expiry
    pub fn insert(&mut self, key: &str, doc: Value) {
        self.entries.insert(
            key.to_string(),
            Entry {
                doc,
                expires_at: None,
            },
        );
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.purge_if_expired(key);
        self.entries.remove(key).is_some()
    }

    fn purge_if_expired(&mut self, key: &str) {
        let now = Instant::now();
        if self.entries.get(key).is_some_and(|e| e.is_expired(now)) {
            self.entries.remove(key);
        }
    }

    fn live_keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|(_, e)| !e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

// =============================================================================
// Recording and Fault Injection
// =============================================================================

/// One round trip as the store received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A single immediate command
    Command(Vec<String>),

    /// A batch of commands sent together
    Batch {
        commands: Vec<Vec<String>>,
        atomic: bool,
        shard_hint: Option<String>,
    },
}

impl Submission {
    /// Verbs of every command in this round trip, in order
    pub fn verbs(&self) -> Vec<String> {
        match self {
            Submission::Command(tokens) => tokens.first().cloned().into_iter().collect(),
            Submission::Batch { commands, .. } => {
                commands.iter().filter_map(|c| c.first().cloned()).collect()
            }
        }
    }
}

/// A one-shot failure applied to the next matching round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Abort the next atomic batch when it reaches this command index
    AbortAt(usize),

    /// Fail the next round trip as if the connection dropped
    Disconnect,
}

struct Shared {
    keyspace: RwLock<Keyspace>,
    history: Mutex<Vec<Submission>>,
    fault: Mutex<Option<Fault>>,
}

/// Transport backed by an in-process keyspace
///
/// Clones share the same keyspace, so a test can keep one handle for
/// inspection while a client owns another.
///
/// ## Concurrency
/// - Each round trip holds the keyspace write lock for its whole duration,
///   so batches never interleave with other round trips
/// - Atomic batches run against a staged copy that is committed only if
///   every command succeeds
#[derive(Clone)]
pub struct MemoryTransport {
    shared: Arc<Shared>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                keyspace: RwLock::new(Keyspace::default()),
                history: Mutex::new(Vec::new()),
                fault: Mutex::new(None),
            }),
        }
    }

    /// Arm a one-shot fault for the next round trip
    pub fn inject_fault(&self, fault: Fault) {
        *self.shared.fault.lock() = Some(fault);
    }

    /// Every round trip received so far
    pub fn history(&self) -> Vec<Submission> {
        self.shared.history.lock().clone()
    }

    pub fn clear_history(&self) {
        self.shared.history.lock().clear();
    }

    /// Current document stored at `key`
    pub fn document(&self, key: &str) -> Option<Value> {
        self.shared.keyspace.read().doc(key).cloned()
    }

    /// Remaining time to live of `key`
    pub fn time_to_live(&self, key: &str) -> Option<Duration> {
        let keyspace = self.shared.keyspace.read();
        let deadline = keyspace.get(key)?.expires_at?;
        Some(deadline.saturating_duration_since(Instant::now()))
    }

    /// Names of all live keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.shared.keyspace.read().live_keys()
    }

    fn take_fault(&self, batch: bool) -> Option<Fault> {
        let mut slot = self.shared.fault.lock();
        match *slot {
            Some(Fault::Disconnect) => slot.take(),
            Some(Fault::AbortAt(_)) if batch => slot.take(),
            _ => None,
        }
    }

    fn record(&self, submission: Submission) {
        self.shared.history.lock().push(submission);
    }
}

fn render(tokens: &[Bytes]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| String::from_utf8_lossy(t).into_owned())
        .collect()
}

impl Transport for MemoryTransport {
    fn send_command(&mut self, tokens: &[Bytes]) -> Result<Reply> {
        self.record(Submission::Command(render(tokens)));

        if let Some(Fault::Disconnect) = self.take_fault(false) {
            return Err(JsonKvError::Transport("connection reset by store".to_string()));
        }

        let mut keyspace = self.shared.keyspace.write();
        Ok(exec::run(&mut keyspace, tokens))
    }

    fn send_batch(
        &mut self,
        commands: &[Vec<Bytes>],
        atomic: bool,
        shard_hint: Option<&str>,
    ) -> Result<BatchReply> {
        self.record(Submission::Batch {
            commands: commands.iter().map(|c| render(c)).collect(),
            atomic,
            shard_hint: shard_hint.map(str::to_string),
        });

        let fault = self.take_fault(true);
        if let Some(Fault::Disconnect) = fault {
            return Err(JsonKvError::Transport("connection reset by store".to_string()));
        }

        let mut keyspace = self.shared.keyspace.write();

        if !atomic {
            let replies = commands.iter().map(|c| exec::run(&mut keyspace, c)).collect();
            return Ok(BatchReply::Replies(replies));
        }

        // Queue-time validation rejects the whole transaction
        for (index, command) in commands.iter().enumerate() {
            if let Err(message) = exec::validate(command) {
                return Ok(BatchReply::Aborted {
                    index,
                    message: format!("EXECABORT Transaction discarded because of previous errors: {}", message),
                });
            }
        }

        let mut staged = keyspace.clone();
        let mut replies = Vec::with_capacity(commands.len());
        for (index, command) in commands.iter().enumerate() {
            if fault == Some(Fault::AbortAt(index)) {
                return Ok(BatchReply::Aborted {
                    index,
                    message: "transaction aborted by store".to_string(),
                });
            }
            match exec::run(&mut staged, command) {
                Reply::Error(message) => return Ok(BatchReply::Aborted { index, message }),
                reply => replies.push(reply),
            }
        }

        *keyspace = staged;
        Ok(BatchReply::Replies(replies))
    }
}
