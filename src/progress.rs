//! Learning-module progression
//!
//! Persisted under `progress-storage`. Tracks which modules are done, where the
//! player should go next, and whether the intro story has been viewed.

use std::collections::BTreeSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::consts::{FIRST_MODULE, PROGRESS_KEY, PROGRESS_VERSION};
use crate::persistence::PersistedSlice;
use crate::platform::KeyValueStore;

/// One player's journey through the ordered modules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressState {
    pub completed_modules: BTreeSet<u32>,
    /// Module the player should be directed to next
    pub current_module: u32,
    /// Intro story viewed
    pub story_completed: bool,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            completed_modules: BTreeSet::new(),
            current_module: FIRST_MODULE,
            story_completed: false,
        }
    }
}

impl ProgressState {
    /// Mark `id` done and move `current_module` past it. Idempotent.
    pub fn complete_module(&mut self, id: u32) {
        self.completed_modules.insert(id);
        self.current_module = self.current_module.max(id.saturating_add(1));
    }

    pub fn set_current_module(&mut self, id: u32) {
        self.current_module = id;
    }

    pub fn complete_story(&mut self) {
        self.story_completed = true;
    }

    pub fn is_module_completed(&self, id: u32) -> bool {
        self.completed_modules.contains(&id)
    }

    /// First module plus everything up to one past the highest completed
    pub fn is_module_unlocked(&self, id: u32) -> bool {
        let frontier = self
            .completed_modules
            .last()
            .map(|max| max.saturating_add(1))
            .unwrap_or(FIRST_MODULE);
        id <= frontier.max(FIRST_MODULE)
    }
}

/// Persisted progress store
pub struct ProgressStore<S> {
    slice: PersistedSlice<S, ProgressState>,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(storage: Rc<S>) -> Self {
        Self {
            slice: PersistedSlice::new(storage, PROGRESS_KEY, PROGRESS_VERSION),
        }
    }

    pub fn state(&mut self) -> &ProgressState {
        self.slice.get()
    }

    pub fn complete_module(&mut self, id: u32) {
        self.slice.update(|p| p.complete_module(id));
        log::info!("Module {} completed", id);
    }

    /// Unconditional override (player revisits an earlier module)
    pub fn set_current_module(&mut self, id: u32) {
        self.slice.update(|p| p.set_current_module(id));
    }

    pub fn complete_story(&mut self) {
        self.slice.update(ProgressState::complete_story);
    }

    pub fn reset_progress(&mut self) {
        self.slice.replace(ProgressState::default());
        log::info!("Progress reset");
    }

    pub fn current_module(&mut self) -> u32 {
        self.state().current_module
    }

    pub fn is_module_completed(&mut self, id: u32) -> bool {
        self.state().is_module_completed(id)
    }

    pub fn is_module_unlocked(&mut self, id: u32) -> bool {
        self.state().is_module_unlocked(id)
    }

    pub fn completed_count(&mut self) -> usize {
        self.state().completed_modules.len()
    }

    /// Forget the in-memory copy so the next access re-reads storage
    pub(crate) fn unload(&mut self) {
        self.slice.unload();
    }
}
