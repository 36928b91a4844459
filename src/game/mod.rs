//! Money-skill mini-games
//!
//! - `session`: deterministic ledger for one mini-game
//! - `rules`: seeded outcome rules that compute each choice's delta
//! - `investment`: persisted investment game (week ledger + total assets)

pub mod investment;
pub mod rules;
pub mod session;

pub use investment::{InvestmentState, InvestmentStore, WeekResult};
pub use rules::{ChoiceRoller, ChoiceRules};
pub use session::{ChoiceKind, ChoiceRecord, GameSession, SessionPhase};
