//! Investment game: the week-1 ledger plus the cross-week aggregate
//!
//! Persisted under `investment-game-storage`. Completing a week folds its net
//! change into `total_money`; nothing flows back from the aggregate into a
//! session.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::rules::ChoiceRoller;
use super::session::{ChoiceKind, ChoiceRecord, GameSession};
use crate::consts::{FIRST_WEEK, INVESTMENT_KEY, INVESTMENT_VERSION, SEED_BALANCE};
use crate::persistence::PersistedSlice;
use crate::platform::{KeyValueStore, time};

/// Summary recorded when a week is completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekResult {
    pub starting_balance: f64,
    pub ending_balance: f64,
    pub net_change: f64,
    /// Number of choices played
    pub choices: usize,
    /// Unix timestamp (ms)
    pub completed_at: f64,
}

/// Aggregate investment-game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredInvestment", into = "StoredInvestment")]
pub struct InvestmentState {
    /// Total assets across completed weeks
    pub total_money: f64,
    pub current_week: u32,
    pub completed_weeks: BTreeSet<u32>,
    pub week1: GameSession,
    pub week_data: BTreeMap<u32, WeekResult>,
}

impl Default for InvestmentState {
    fn default() -> Self {
        Self {
            total_money: SEED_BALANCE,
            current_week: FIRST_WEEK,
            completed_weeks: BTreeSet::new(),
            week1: GameSession::new(SEED_BALANCE),
            week_data: BTreeMap::new(),
        }
    }
}

impl InvestmentState {
    /// Complete week 1 and fold its net change into `total_money`.
    ///
    /// Returns the folded amount, or `None` if week 1 was already completed.
    pub fn complete_week1(&mut self, now: f64) -> Option<f64> {
        let net = self.week1.complete()?;
        self.total_money += net;
        self.completed_weeks.insert(FIRST_WEEK);
        self.week_data.insert(
            FIRST_WEEK,
            WeekResult {
                starting_balance: self.week1.seed(),
                ending_balance: self.week1.balance(),
                net_change: net,
                choices: self.week1.choice_log().len(),
                completed_at: now,
            },
        );
        self.current_week = self.current_week.max(FIRST_WEEK + 1);
        Some(net)
    }

    pub fn is_week_completed(&self, week: u32) -> bool {
        self.completed_weeks.contains(&week)
    }
}

/// Flat storage layout of [`InvestmentState`]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredInvestment {
    total_money: f64,
    current_week: u32,
    completed_weeks: Vec<u32>,
    week1_money: f64,
    week1_completed: bool,
    week1_choices: Vec<ChoiceRecord>,
    week_data: BTreeMap<u32, WeekResult>,
}

impl Default for StoredInvestment {
    fn default() -> Self {
        InvestmentState::default().into()
    }
}

impl From<InvestmentState> for StoredInvestment {
    fn from(state: InvestmentState) -> Self {
        Self {
            total_money: state.total_money,
            current_week: state.current_week,
            completed_weeks: state.completed_weeks.into_iter().collect(),
            week1_money: state.week1.balance(),
            week1_completed: state.week1.is_completed(),
            week1_choices: state.week1.choice_log().to_vec(),
            week_data: state.week_data,
        }
    }
}

impl From<StoredInvestment> for InvestmentState {
    fn from(stored: StoredInvestment) -> Self {
        Self {
            total_money: stored.total_money,
            current_week: stored.current_week,
            completed_weeks: stored.completed_weeks.into_iter().collect(),
            week1: GameSession::restore(
                SEED_BALANCE,
                stored.week1_money,
                stored.week1_choices,
                stored.week1_completed,
            ),
            week_data: stored.week_data,
        }
    }
}

/// Persisted investment-game store
pub struct InvestmentStore<S> {
    slice: PersistedSlice<S, InvestmentState>,
}

impl<S: KeyValueStore> InvestmentStore<S> {
    pub fn new(storage: Rc<S>) -> Self {
        Self {
            slice: PersistedSlice::new(storage, INVESTMENT_KEY, INVESTMENT_VERSION),
        }
    }

    pub fn state(&mut self) -> &InvestmentState {
        self.slice.get()
    }

    pub fn week1(&mut self) -> &GameSession {
        &self.state().week1
    }

    pub fn total_money(&mut self) -> f64 {
        self.state().total_money
    }

    /// Record a week-1 choice with a delta computed by the game rules.
    ///
    /// Rejected (returns `false`) once week 1 is completed; reset first.
    pub fn apply_choice(&mut self, kind: ChoiceKind, delta: f64) -> bool {
        if self.week1().is_completed() {
            log::warn!("Ignoring {} choice: week 1 already completed", kind.as_str());
            return false;
        }
        let now = time::now_ms();
        self.slice
            .update(|s| s.week1.apply_choice(kind, delta, now));
        true
    }

    /// Roll the outcome of `kind` against the current balance and record it
    pub fn play(&mut self, kind: ChoiceKind, roller: &mut ChoiceRoller) -> Option<f64> {
        let delta = roller.roll(kind, self.week1().balance());
        self.apply_choice(kind, delta).then_some(delta)
    }

    /// Restart week 1 from the seed balance. `total_money` is untouched.
    pub fn reset_week1(&mut self) {
        self.slice.update(|s| s.week1.reset());
        log::info!("Week 1 reset");
    }

    /// Complete week 1, folding its net change into total assets
    pub fn complete_week1(&mut self) -> Option<f64> {
        let now = time::now_ms();
        let folded = self.slice.update(|s| s.complete_week1(now));
        match folded {
            Some(net) => log::info!("Week 1 completed, net change {:.2}", net),
            None => log::info!("Week 1 already completed"),
        }
        folded
    }

    pub fn set_current_week(&mut self, week: u32) {
        self.slice.update(|s| s.current_week = week);
    }

    /// Whole game back to defaults
    pub fn reset_game(&mut self) {
        self.slice.replace(InvestmentState::default());
        log::info!("Investment game reset");
    }

    pub(crate) fn unload(&mut self) {
        self.slice.unload();
    }
}
