//! crates/essay_writer_core/src/history.rs
//!
//! The history store: newest-first list of past generations, capped at
//! `HISTORY_CAPACITY` and written through to a `KeyValueStore` on every mutation.
//!
//! Persistence problems never reach the caller. Reads fall back to an empty
//! history, writes are logged and the in-memory list stays authoritative.

use crate::domain::HistoryEntry;
use crate::ports::{KeyValueStore, PortError, PortResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// The single key the serialized history lives under.
pub const HISTORY_KEY: &str = "essay_history";

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 20;

/// Whether the store holds any entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    Empty,
    NonEmpty,
}

/// Proof that the user explicitly agreed to wipe the history.
#[derive(Debug)]
pub struct ClearConfirmation {
    _private: (),
}

impl ClearConfirmation {
    /// Returns a confirmation only for an affirmative answer.
    pub fn from_user_response(confirmed: bool) -> Option<Self> {
        confirmed.then_some(Self { _private: () })
    }
}

pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    backend: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    /// Constructs the store from whatever is persisted in `backend`.
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        let entries = Self::load(backend.as_ref());
        debug!(entries = entries.len(), "History store opened.");
        Self { entries, backend }
    }

    /// Reads the persisted history. Missing, unreadable or foreign data yields an empty list.
    pub fn load(backend: &dyn KeyValueStore) -> Vec<HistoryEntry> {
        let raw = match backend.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read essay history; starting empty.");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(HISTORY_CAPACITY);
                entries
            }
            Err(e) => {
                warn!(error = %e, "Persisted essay history is unreadable; starting empty.");
                Vec::new()
            }
        }
    }

    /// Adds an entry at the front, dropping the oldest one beyond capacity.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        self.persist();
    }

    /// Deletes the entry with `id`. Unknown ids leave the list untouched.
    /// Returns whether an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        self.persist();
        removed
    }

    pub fn clear(&mut self, _confirmation: ClearConfirmation) {
        self.entries.clear();
        self.persist();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self) -> HistoryState {
        if self.entries.is_empty() {
            HistoryState::Empty
        } else {
            HistoryState::NonEmpty
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))
            .and_then(|json| self.backend.set(HISTORY_KEY, &json));

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist essay history; keeping it in memory only.");
        }
    }
}

//=========================================================================================
// In-Memory Key-Value Store
//=========================================================================================

/// A `KeyValueStore` kept entirely in memory. Used for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| PortError::Storage(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
