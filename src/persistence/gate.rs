//! Storage version gate
//!
//! Runs once at startup, before any store hydrates. If the persisted marker
//! is missing or differs from [`STORAGE_VERSION`], every key is erased and the
//! marker rewritten, so no store ever reads a shape from an older build.

use std::rc::Rc;

use crate::consts::{STORAGE_VERSION, VERSION_KEY};
use crate::platform::{KeyValueStore, MemoryStorage, StorageError};

/// What [`VersionGate::init_storage`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Marker already matched; storage untouched
    Current,
    /// Storage erased; `previous` is the marker found (if any)
    Purged { previous: Option<String> },
    /// Backend failed; behaving as if storage were empty
    Unavailable,
}

/// Backend the stores hydrate from once the gate has run.
///
/// If the gate could not verify or purge the real backend, stores get an empty
/// in-memory backend instead, so stale state is never read.
pub enum GatedStorage<S> {
    Persistent(Rc<S>),
    Memory(MemoryStorage),
}

impl<S> GatedStorage<S> {
    pub fn for_outcome(storage: Rc<S>, outcome: &GateOutcome) -> Self {
        match outcome {
            GateOutcome::Unavailable => {
                log::warn!("Storage not verified, progress will not persist this session");
                GatedStorage::Memory(MemoryStorage::new())
            }
            GateOutcome::Current | GateOutcome::Purged { .. } => GatedStorage::Persistent(storage),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, GatedStorage::Persistent(_))
    }
}

impl<S: KeyValueStore> KeyValueStore for GatedStorage<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            GatedStorage::Persistent(s) => s.get(key),
            GatedStorage::Memory(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            GatedStorage::Persistent(s) => s.set(key, value),
            GatedStorage::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            GatedStorage::Persistent(s) => s.remove(key),
            GatedStorage::Memory(s) => s.remove(key),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        match self {
            GatedStorage::Persistent(s) => s.clear(),
            GatedStorage::Memory(s) => s.clear(),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        match self {
            GatedStorage::Persistent(s) => s.keys(),
            GatedStorage::Memory(s) => s.keys(),
        }
    }
}

pub struct VersionGate<S> {
    storage: Rc<S>,
}

impl<S: KeyValueStore> VersionGate<S> {
    pub fn new(storage: Rc<S>) -> Self {
        Self { storage }
    }

    /// Check the marker and purge on mismatch. Never fails.
    pub fn init_storage(&self) -> GateOutcome {
        let previous = match self.storage.get(VERSION_KEY) {
            Ok(marker) => marker,
            Err(e) => {
                log::warn!("Storage unavailable, skipping version check: {}", e);
                return GateOutcome::Unavailable;
            }
        };

        if previous.as_deref() == Some(STORAGE_VERSION) {
            return GateOutcome::Current;
        }

        log::info!(
            "Storage version {:?} != {}, clearing persisted state",
            previous,
            STORAGE_VERSION
        );
        if !self.purge() {
            return GateOutcome::Unavailable;
        }
        GateOutcome::Purged { previous }
    }

    /// Persisted marker, or `None` if absent or unreadable
    pub fn storage_version(&self) -> Option<String> {
        self.storage.get(VERSION_KEY).ok().flatten()
    }

    /// Erase everything and rewrite the marker ("reset everything")
    pub fn clear_storage(&self) {
        if self.purge() {
            log::info!("All persisted state cleared");
        }
    }

    fn purge(&self) -> bool {
        let result = self
            .storage
            .clear()
            .and_then(|()| self.storage.set(VERSION_KEY, STORAGE_VERSION));
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to clear storage: {}", e);
                false
            }
        }
    }
}
