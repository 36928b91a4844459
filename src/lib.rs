//! Coinpath - persisted progress and game state for a money-skills course
//!
//! Core modules:
//! - `platform`: Storage backends (LocalStorage, file, memory) and time
//! - `persistence`: Version gate and versioned per-store slices
//! - `progress`: Learning-module progression
//! - `game`: Mini-game ledgers, outcome rules, investment game store
//! - `app`: Application root owning storage and stores

pub mod app;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod progress;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{App, AppSnapshot};
pub use game::{ChoiceKind, ChoiceRoller, ChoiceRules, GameSession, InvestmentStore};
pub use persistence::{GateOutcome, VersionGate};
pub use progress::{ProgressState, ProgressStore};

/// Configuration constants
pub mod consts {
    /// Persisted-schema generation. Bump to purge every player's storage on next load.
    pub const STORAGE_VERSION: &str = "2.0.0";
    /// Key holding the version marker
    pub const VERSION_KEY: &str = "coinpath-storage-version";

    /// Progress store key and slice version
    pub const PROGRESS_KEY: &str = "progress-storage";
    pub const PROGRESS_VERSION: u32 = 1;

    /// Investment game key and slice version
    pub const INVESTMENT_KEY: &str = "investment-game-storage";
    pub const INVESTMENT_VERSION: u32 = 1;

    /// First learning module
    pub const FIRST_MODULE: u32 = 1;
    /// First investment-game week
    pub const FIRST_WEEK: u32 = 1;

    /// Starting balance of every mini-game session
    pub const SEED_BALANCE: f64 = 1000.0;

    /// Fixed interest for a save round
    pub const SAVE_INTEREST_RATE: f64 = 0.05;
    /// Gain on a winning investment
    pub const INVEST_GAIN_RATE: f64 = 0.20;
    /// Loss on a losing investment
    pub const INVEST_LOSS_RATE: f64 = 0.10;
    /// Chance an investment wins
    pub const INVEST_WIN_CHANCE: f64 = 0.5;
}
