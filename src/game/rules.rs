//! Outcome rules for save/invest rounds
//!
//! Deltas are computed here and handed to the ledger, so the ledger itself stays
//! deterministic. The roller uses a seeded RNG: same seed, same outcomes.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::session::ChoiceKind;
use crate::consts::{INVEST_GAIN_RATE, INVEST_LOSS_RATE, INVEST_WIN_CHANCE, SAVE_INTEREST_RATE};

/// Tunable rates for one game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceRules {
    /// Fixed interest earned by saving (fraction of balance)
    pub save_rate: f64,
    /// Gain on a winning investment (fraction of balance)
    pub invest_gain: f64,
    /// Loss on a losing investment (fraction of balance)
    pub invest_loss: f64,
    /// Probability an investment wins (0.0 - 1.0)
    pub win_chance: f64,
}

impl Default for ChoiceRules {
    fn default() -> Self {
        Self {
            save_rate: SAVE_INTEREST_RATE,
            invest_gain: INVEST_GAIN_RATE,
            invest_loss: INVEST_LOSS_RATE,
            win_chance: INVEST_WIN_CHANCE,
        }
    }
}

impl ChoiceRules {
    /// Delta for a save round
    pub fn save_delta(&self, balance: f64) -> f64 {
        round_cents(balance * self.save_rate)
    }

    /// Delta for an invest round with a known outcome
    pub fn invest_delta(&self, balance: f64, won: bool) -> f64 {
        if won {
            round_cents(balance * self.invest_gain)
        } else {
            -round_cents(balance * self.invest_loss)
        }
    }

    /// `win_chance` as a valid probability; NaN counts as never winning
    pub fn win_probability(&self) -> f64 {
        if self.win_chance.is_nan() {
            0.0
        } else {
            self.win_chance.clamp(0.0, 1.0)
        }
    }
}

/// Rolls outcomes for choices
#[derive(Debug, Clone)]
pub struct ChoiceRoller {
    rules: ChoiceRules,
    rng: Pcg32,
}

impl ChoiceRoller {
    pub fn new(rules: ChoiceRules, seed: u64) -> Self {
        Self {
            rules,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Balance change for playing `kind` against `balance`
    pub fn roll(&mut self, kind: ChoiceKind, balance: f64) -> f64 {
        match kind {
            ChoiceKind::Save => self.rules.save_delta(balance),
            ChoiceKind::Invest => {
                let won = self.rng.random_bool(self.rules.win_probability());
                self.rules.invest_delta(balance, won)
            }
        }
    }
}

#[inline]
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_is_fixed_interest() {
        let rules = ChoiceRules::default();
        assert_eq!(rules.save_delta(1000.0), 50.0);
        let mut roller = ChoiceRoller::new(rules, 1);
        assert_eq!(roller.roll(ChoiceKind::Save, 1000.0), 50.0);
        assert_eq!(roller.roll(ChoiceKind::Save, 1000.0), 50.0);
    }

    #[test]
    fn test_invest_outcomes() {
        let rules = ChoiceRules::default();
        assert_eq!(rules.invest_delta(1000.0, true), 200.0);
        assert_eq!(rules.invest_delta(1000.0, false), -100.0);
    }

    #[test]
    fn test_invest_is_one_of_two_outcomes() {
        let mut roller = ChoiceRoller::new(ChoiceRules::default(), 42);
        for _ in 0..100 {
            let delta = roller.roll(ChoiceKind::Invest, 1000.0);
            assert!(delta == 200.0 || delta == -100.0, "unexpected delta {delta}");
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = ChoiceRoller::new(ChoiceRules::default(), 99999);
        let mut b = ChoiceRoller::new(ChoiceRules::default(), 99999);
        for _ in 0..50 {
            assert_eq!(
                a.roll(ChoiceKind::Invest, 1000.0),
                b.roll(ChoiceKind::Invest, 1000.0)
            );
        }
    }

    #[test]
    fn test_certain_outcomes() {
        let always = ChoiceRules {
            win_chance: 1.0,
            ..Default::default()
        };
        let never = ChoiceRules {
            win_chance: 0.0,
            ..Default::default()
        };
        let mut win = ChoiceRoller::new(always, 7);
        let mut lose = ChoiceRoller::new(never, 7);
        assert_eq!(win.roll(ChoiceKind::Invest, 500.0), 100.0);
        assert_eq!(lose.roll(ChoiceKind::Invest, 500.0), -50.0);
    }

    #[test]
    fn test_out_of_range_win_chance() {
        let nan = ChoiceRules {
            win_chance: f64::NAN,
            ..Default::default()
        };
        assert_eq!(nan.win_probability(), 0.0);
        let mut roller = ChoiceRoller::new(nan, 3);
        assert_eq!(roller.roll(ChoiceKind::Invest, 1000.0), -100.0);

        let high = ChoiceRules {
            win_chance: 7.0,
            ..Default::default()
        };
        assert_eq!(high.win_probability(), 1.0);
        let mut roller = ChoiceRoller::new(high, 3);
        assert_eq!(roller.roll(ChoiceKind::Invest, 1000.0), 200.0);
    }

    #[test]
    fn test_rules_from_partial_json() {
        let rules: ChoiceRules = serde_json::from_str(r#"{"winChance":0.25}"#).unwrap();
        assert_eq!(rules.win_chance, 0.25);
        assert_eq!(rules.save_rate, SAVE_INTEREST_RATE);
    }
}
