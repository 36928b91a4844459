//! One store's slice of persisted storage

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::platform::{KeyValueStore, StorageError};

/// On-disk shape of every slice: `{"state": ..., "version": n}`
#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

/// State is kept as a raw value until the version has been checked, so an old
/// slice with a different shape is discarded instead of failing to parse.
#[derive(Deserialize)]
struct RawEnvelope {
    state: serde_json::Value,
    version: u32,
}

/// A value of type `T` owned by exactly one storage key.
///
/// Hydrates lazily on first access and writes back synchronously after every
/// mutation made through [`update`](Self::update) or [`replace`](Self::replace).
/// If the backend fails, the value lives in memory only for this session.
pub struct PersistedSlice<S, T> {
    storage: Rc<S>,
    key: &'static str,
    version: u32,
    state: Option<T>,
}

impl<S, T> PersistedSlice<S, T>
where
    S: KeyValueStore,
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(storage: Rc<S>, key: &'static str, version: u32) -> Self {
        Self {
            storage,
            key,
            version,
            state: None,
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.state.is_some()
    }

    /// Current value, reading storage on first access
    pub fn get(&mut self) -> &T {
        self.hydrate()
    }

    /// Mutate the value and persist it before returning
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(self.hydrate());
        self.save();
        result
    }

    /// Replace the value wholesale and persist it
    pub fn replace(&mut self, state: T) {
        self.state = Some(state);
        self.save();
    }

    /// Drop the in-memory copy; the next access re-reads storage
    pub fn unload(&mut self) {
        self.state = None;
    }

    fn hydrate(&mut self) -> &mut T {
        let storage = &self.storage;
        let (key, version) = (self.key, self.version);
        self.state
            .get_or_insert_with(|| load(storage.as_ref(), key, version).unwrap_or_default())
    }

    fn save(&self) {
        let Some(state) = &self.state else {
            return;
        };
        let envelope = EnvelopeRef {
            state,
            version: self.version,
        };
        let result = serde_json::to_string(&envelope)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(self.key, &json));
        if let Err(e) = result {
            log::warn!("Failed to persist {}: {} (keeping state in memory)", self.key, e);
        }
    }
}

fn load<S, T>(storage: &S, key: &str, version: u32) -> Option<T>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let json = match storage.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => {
            log::info!("No stored {}, using defaults", key);
            return None;
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}", key, e);
            return None;
        }
    };

    let envelope: RawEnvelope = match serde_json::from_str(&json) {
        Ok(envelope) => envelope,
        Err(e) => {
            log::warn!("Discarding unreadable {}: {}", key, e);
            return None;
        }
    };

    if envelope.version != version {
        log::info!(
            "Discarding {} (slice version {}, expected {})",
            key,
            envelope.version,
            version
        );
        return None;
    }

    match serde_json::from_value(envelope.state) {
        Ok(state) => {
            log::info!("Loaded {}", key);
            Some(state)
        }
        Err(e) => {
            log::warn!("Discarding malformed {}: {}", key, e);
            None
        }
    }
}
