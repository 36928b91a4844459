//! Application root
//!
//! Owns the storage backend and every store. Construct once at startup and
//! pass it to whatever needs it; there is no global instance.

use std::rc::Rc;

use serde::Serialize;

use crate::game::{InvestmentState, InvestmentStore};
use crate::persistence::{GateOutcome, GatedStorage, VersionGate};
use crate::platform::KeyValueStore;
use crate::progress::{ProgressState, ProgressStore};

/// Read-only view of all store state, for UI layers that want one payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub storage_version: Option<String>,
    pub progress: ProgressState,
    pub investment: InvestmentState,
}

pub struct App<S> {
    gate: VersionGate<S>,
    boot_outcome: GateOutcome,
    /// What the stores read and write; in-memory if the gate could not run
    store_storage: Rc<GatedStorage<S>>,
    progress: ProgressStore<GatedStorage<S>>,
    investment: InvestmentStore<GatedStorage<S>>,
}

impl<S: KeyValueStore> App<S> {
    /// Run the version gate, then create the stores.
    ///
    /// Stores hydrate lazily, so they always read post-gate storage. If the
    /// gate could not verify the backend, stores start empty and in memory.
    pub fn boot(storage: Rc<S>) -> Self {
        let gate = VersionGate::new(Rc::clone(&storage));
        let boot_outcome = gate.init_storage();
        log::info!("Storage ready ({:?})", boot_outcome);
        let store_storage = Rc::new(GatedStorage::for_outcome(storage, &boot_outcome));
        Self {
            gate,
            boot_outcome,
            progress: ProgressStore::new(Rc::clone(&store_storage)),
            investment: InvestmentStore::new(Rc::clone(&store_storage)),
            store_storage,
        }
    }

    /// What the version gate did at boot
    pub fn boot_outcome(&self) -> &GateOutcome {
        &self.boot_outcome
    }

    pub fn storage_version(&self) -> Option<String> {
        self.gate.storage_version()
    }

    /// Whether store changes reach the real backend
    pub fn is_persistent(&self) -> bool {
        self.store_storage.is_persistent()
    }

    pub fn progress(&mut self) -> &mut ProgressStore<GatedStorage<S>> {
        &mut self.progress
    }

    pub fn investment(&mut self) -> &mut InvestmentStore<GatedStorage<S>> {
        &mut self.investment
    }

    /// Purge all persisted state and drop every store back to defaults
    pub fn reset_everything(&mut self) {
        self.gate.clear_storage();
        if !self.store_storage.is_persistent() {
            let _ = self.store_storage.clear();
        }
        self.progress.unload();
        self.investment.unload();
    }

    pub fn snapshot(&mut self) -> AppSnapshot {
        AppSnapshot {
            storage_version: self.storage_version(),
            progress: self.progress.state().clone(),
            investment: self.investment.state().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{INVESTMENT_KEY, PROGRESS_KEY, STORAGE_VERSION, VERSION_KEY};
    use crate::game::ChoiceKind;
    use crate::platform::MemoryStorage;
    use crate::platform::StorageError;
    use crate::platform::storage::BrokenStorage;
    use std::cell::Cell;

    const LEGACY_PROGRESS: &str =
        r#"{"state":{"completedModules":[1,2],"currentModule":3,"storyCompleted":true},"version":1}"#;

    /// Reads and writes work, `clear` does not
    struct NoClearStorage(MemoryStorage);

    impl KeyValueStore for NoClearStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key)
        }
        fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("clear blocked".to_string()))
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            self.0.keys()
        }
    }

    /// First read fails, everything after succeeds
    struct FlakyFirstRead {
        inner: MemoryStorage,
        failed: Cell<bool>,
    }

    impl KeyValueStore for FlakyFirstRead {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if !self.failed.replace(true) {
                return Err(StorageError::Unavailable("transient".to_string()));
            }
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
        fn clear(&self) -> Result<(), StorageError> {
            self.inner.clear()
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            self.inner.keys()
        }
    }

    #[test]
    fn test_fresh_boot() {
        let storage = Rc::new(MemoryStorage::new());
        let mut app = App::boot(Rc::clone(&storage));

        assert_eq!(app.boot_outcome(), &GateOutcome::Purged { previous: None });
        assert_eq!(app.storage_version().as_deref(), Some(STORAGE_VERSION));
        assert_eq!(app.progress().current_module(), 1);
        assert_eq!(app.investment().week1().balance(), 1000.0);
    }

    #[test]
    fn test_restart_keeps_progress() {
        let storage = Rc::new(MemoryStorage::new());
        {
            let mut app = App::boot(Rc::clone(&storage));
            app.progress().complete_module(1);
            app.investment().apply_choice(ChoiceKind::Save, 50.0);
        }

        let mut app = App::boot(storage);
        assert_eq!(app.boot_outcome(), &GateOutcome::Current);
        assert!(app.progress().is_module_completed(1));
        assert_eq!(app.investment().week1().balance(), 1050.0);
    }

    #[test]
    fn test_old_build_state_is_purged_before_hydration() {
        let storage = Rc::new(MemoryStorage::with_items([
            (VERSION_KEY, "legacy"),
            (PROGRESS_KEY, LEGACY_PROGRESS),
        ]));
        let mut app = App::boot(storage);
        assert_eq!(app.progress().state(), &ProgressState::default());
    }

    #[test]
    fn test_reset_everything() {
        let storage = Rc::new(MemoryStorage::new());
        let mut app = App::boot(Rc::clone(&storage));
        app.progress().complete_module(2);
        app.progress().complete_story();
        app.investment().apply_choice(ChoiceKind::Invest, 200.0);

        app.reset_everything();

        assert_eq!(storage.keys().unwrap(), vec![VERSION_KEY.to_string()]);
        assert_eq!(app.progress().state(), &ProgressState::default());
        assert_eq!(app.investment().state(), &InvestmentState::default());
        assert_eq!(storage.get(INVESTMENT_KEY).unwrap(), None);
    }

    #[test]
    fn test_broken_storage_still_playable() {
        let mut app = App::boot(Rc::new(BrokenStorage));
        assert_eq!(app.boot_outcome(), &GateOutcome::Unavailable);

        app.progress().complete_module(1);
        app.investment().apply_choice(ChoiceKind::Save, 50.0);
        assert_eq!(app.progress().current_module(), 2);
        assert_eq!(app.investment().week1().balance(), 1050.0);

        let snapshot = app.snapshot();
        assert_eq!(snapshot.storage_version, None);
        assert_eq!(snapshot.progress.current_module, 2);
    }

    #[test]
    fn test_failed_purge_hides_stale_state() {
        let storage = Rc::new(NoClearStorage(MemoryStorage::with_items([
            (VERSION_KEY, "legacy"),
            (PROGRESS_KEY, LEGACY_PROGRESS),
        ])));
        let mut app = App::boot(Rc::clone(&storage));

        assert_eq!(app.boot_outcome(), &GateOutcome::Unavailable);
        assert!(!app.is_persistent());
        assert_eq!(app.progress().state(), &ProgressState::default());

        // Writes stay in memory; the stale slice on the backend is not overwritten
        app.progress().complete_module(1);
        assert_eq!(app.progress().current_module(), 2);
        assert_eq!(
            storage.get(PROGRESS_KEY).unwrap().as_deref(),
            Some(LEGACY_PROGRESS)
        );
    }

    #[test]
    fn test_unreadable_marker_hides_stale_state() {
        let storage = Rc::new(FlakyFirstRead {
            inner: MemoryStorage::with_items([
                (VERSION_KEY, "legacy"),
                (PROGRESS_KEY, LEGACY_PROGRESS),
            ]),
            failed: Cell::new(false),
        });
        let mut app = App::boot(storage);

        assert_eq!(app.boot_outcome(), &GateOutcome::Unavailable);
        assert_eq!(app.progress().state(), &ProgressState::default());
    }

    #[test]
    fn test_reset_everything_in_memory_mode() {
        let mut app = App::boot(Rc::new(BrokenStorage));
        app.progress().complete_module(3);
        app.investment().apply_choice(ChoiceKind::Save, 50.0);

        app.reset_everything();

        assert_eq!(app.progress().state(), &ProgressState::default());
        assert_eq!(app.investment().state(), &InvestmentState::default());
    }
}
