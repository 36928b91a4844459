//! Browser bindings
//!
//! `WebApp` is the handle UI components hold. It wraps [`App`] over
//! LocalStorage, falling back to in-memory storage when LocalStorage is
//! unavailable.

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::game::{ChoiceKind, ChoiceRoller, ChoiceRules};
use crate::platform::{KeyValueStore, LocalStorage, MemoryStorage, StorageError};

/// Whichever backend the browser allows
enum BrowserStorage {
    Local(LocalStorage),
    Memory(MemoryStorage),
}

impl BrowserStorage {
    fn open() -> Self {
        match LocalStorage::open() {
            Ok(storage) => BrowserStorage::Local(storage),
            Err(e) => {
                log::warn!("LocalStorage unavailable ({}), progress will not persist", e);
                BrowserStorage::Memory(MemoryStorage::new())
            }
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            BrowserStorage::Local(s) => s.get(key),
            BrowserStorage::Memory(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            BrowserStorage::Local(s) => s.set(key, value),
            BrowserStorage::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            BrowserStorage::Local(s) => s.remove(key),
            BrowserStorage::Memory(s) => s.remove(key),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        match self {
            BrowserStorage::Local(s) => s.clear(),
            BrowserStorage::Memory(s) => s.clear(),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        match self {
            BrowserStorage::Local(s) => s.keys(),
            BrowserStorage::Memory(s) => s.keys(),
        }
    }
}

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Coinpath state core loaded");
}

#[wasm_bindgen]
pub struct WebApp {
    app: App<BrowserStorage>,
    roller: ChoiceRoller,
}

#[wasm_bindgen]
impl WebApp {
    /// Boot storage and stores. Outcomes are seeded from `seed`, or the clock.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>) -> WebApp {
        let seed = seed.map(u64::from).unwrap_or_else(|| js_sys::Date::now() as u64);
        WebApp {
            app: App::boot(Rc::new(BrowserStorage::open())),
            roller: ChoiceRoller::new(ChoiceRules::default(), seed),
        }
    }

    /// All store state as JSON
    pub fn snapshot(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.app.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = storageVersion)]
    pub fn storage_version(&self) -> Option<String> {
        self.app.storage_version()
    }

    #[wasm_bindgen(js_name = resetEverything)]
    pub fn reset_everything(&mut self) {
        self.app.reset_everything();
    }

    // === Progress ===

    #[wasm_bindgen(js_name = completeModule)]
    pub fn complete_module(&mut self, id: u32) {
        self.app.progress().complete_module(id);
    }

    #[wasm_bindgen(js_name = setCurrentModule)]
    pub fn set_current_module(&mut self, id: u32) {
        self.app.progress().set_current_module(id);
    }

    #[wasm_bindgen(js_name = completeStory)]
    pub fn complete_story(&mut self) {
        self.app.progress().complete_story();
    }

    #[wasm_bindgen(js_name = resetProgress)]
    pub fn reset_progress(&mut self) {
        self.app.progress().reset_progress();
    }

    #[wasm_bindgen(js_name = currentModule)]
    pub fn current_module(&mut self) -> u32 {
        self.app.progress().current_module()
    }

    #[wasm_bindgen(js_name = isModuleUnlocked)]
    pub fn is_module_unlocked(&mut self, id: u32) -> bool {
        self.app.progress().is_module_unlocked(id)
    }

    // === Investment game ===

    /// Roll and record a "save" or "invest" round; returns the delta
    #[wasm_bindgen(js_name = playChoice)]
    pub fn play_choice(&mut self, kind: &str) -> Option<f64> {
        let Some(kind) = ChoiceKind::from_str(kind) else {
            log::warn!("Unknown choice kind {:?}", kind);
            return None;
        };
        self.app.investment().play(kind, &mut self.roller)
    }

    /// Record a round whose delta the caller already computed
    #[wasm_bindgen(js_name = applyChoice)]
    pub fn apply_choice(&mut self, kind: &str, delta: f64) -> bool {
        match ChoiceKind::from_str(kind) {
            Some(kind) => self.app.investment().apply_choice(kind, delta),
            None => {
                log::warn!("Unknown choice kind {:?}", kind);
                false
            }
        }
    }

    #[wasm_bindgen(js_name = resetWeek1)]
    pub fn reset_week1(&mut self) {
        self.app.investment().reset_week1();
    }

    #[wasm_bindgen(js_name = completeWeek1)]
    pub fn complete_week1(&mut self) -> Option<f64> {
        self.app.investment().complete_week1()
    }

    #[wasm_bindgen(js_name = resetGame)]
    pub fn reset_game(&mut self) {
        self.app.investment().reset_game();
    }

    #[wasm_bindgen(js_name = week1Balance)]
    pub fn week1_balance(&mut self) -> f64 {
        self.app.investment().week1().balance()
    }

    #[wasm_bindgen(js_name = totalMoney)]
    pub fn total_money(&mut self) -> f64 {
        self.app.investment().total_money()
    }
}
