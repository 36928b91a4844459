//! Mini-game ledger: one balance plus the choices that moved it
//!
//! The session is deterministic. Outcome randomness lives in
//! [`rules`](super::rules); the ledger only records the deltas it is given.

use serde::{Deserialize, Serialize};

/// Tolerance when comparing a replayed balance against the stored one
const BALANCE_EPSILON: f64 = 1e-6;

/// Kind of decision the player made in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceKind {
    /// Safe, fixed-interest savings
    Save,
    /// Risky market investment
    Invest,
}

impl ChoiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceKind::Save => "save",
            ChoiceKind::Invest => "invest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "save" => Some(ChoiceKind::Save),
            "invest" => Some(ChoiceKind::Invest),
            _ => None,
        }
    }
}

/// One entry in the choice log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    #[serde(rename = "choice")]
    pub kind: ChoiceKind,
    /// Signed change in balance
    #[serde(rename = "result")]
    pub delta: f64,
    /// Unix timestamp (ms)
    pub timestamp: f64,
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No choices yet
    Idle,
    /// At least one choice applied
    Active,
    /// Terminal; only `reset` leaves it
    Completed,
}

/// Ledger for one mini-game.
///
/// `balance == seed + sum(choice_log.delta)` holds after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    seed: f64,
    balance: f64,
    choice_log: Vec<ChoiceRecord>,
    completed: bool,
}

impl GameSession {
    pub fn new(seed: f64) -> Self {
        Self {
            seed,
            balance: seed,
            choice_log: Vec::new(),
            completed: false,
        }
    }

    /// Rebuild a session from persisted parts.
    ///
    /// If `balance` disagrees with the replayed log, the log wins.
    pub fn restore(seed: f64, balance: f64, choice_log: Vec<ChoiceRecord>, completed: bool) -> Self {
        let mut session = Self {
            seed,
            balance,
            choice_log,
            completed,
        };
        let replayed = session.replayed_balance();
        if (replayed - balance).abs() > BALANCE_EPSILON {
            log::warn!(
                "Stored balance {} disagrees with choice log ({}), using log",
                balance,
                replayed
            );
            session.balance = replayed;
        }
        session
    }

    /// Append a choice and move the balance by `delta`.
    ///
    /// Completion is not checked here; callers that care must guard.
    pub fn apply_choice(&mut self, kind: ChoiceKind, delta: f64, timestamp: f64) {
        self.choice_log.push(ChoiceRecord {
            kind,
            delta,
            timestamp,
        });
        self.balance += delta;
    }

    /// Back to the seed balance with an empty log, from any phase
    pub fn reset(&mut self) {
        self.balance = self.seed;
        self.choice_log.clear();
        self.completed = false;
    }

    /// Mark completed and return the net change to fold into the aggregate.
    ///
    /// Returns `None` if the session was already completed.
    pub fn complete(&mut self) -> Option<f64> {
        if self.completed {
            return None;
        }
        self.completed = true;
        Some(self.net_change())
    }

    pub fn phase(&self) -> SessionPhase {
        if self.completed {
            SessionPhase::Completed
        } else if self.choice_log.is_empty() {
            SessionPhase::Idle
        } else {
            SessionPhase::Active
        }
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn choice_log(&self) -> &[ChoiceRecord] {
        &self.choice_log
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn net_change(&self) -> f64 {
        self.balance - self.seed
    }

    /// Seed plus every logged delta, in order
    pub fn replayed_balance(&self) -> f64 {
        self.choice_log
            .iter()
            .fold(self.seed, |balance, record| balance + record.delta)
    }

    /// Number of rounds of `kind` played
    pub fn count_of(&self, kind: ChoiceKind) -> usize {
        self.choice_log.iter().filter(|r| r.kind == kind).count()
    }
}
