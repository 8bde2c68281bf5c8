//! Reward ledger and the rules that feed it.
//!
//! Two currencies are earned: water drops and sunlight points. Both can only
//! grow through [`RewardLedger::grant`] and shrink through a balance-checked
//! [`RewardLedger::spend`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Focus sessions at least this long earn the larger session reward.
pub const LONG_FOCUS_MIN: u32 = 25;
/// Tasks at least this long pay out sunlight instead of water on completion.
pub const LONG_TASK_MIN: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Water,
    Sunlight,
}

impl Currency {
    pub fn plural_name(self) -> &'static str {
        match self {
            Currency::Water => "Water Drops",
            Currency::Sunlight => "Sunlight Points",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural_name())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" | "waterdrops" | "water-drops" => Ok(Currency::Water),
            "sunlight" | "sun" | "sunlightpoints" | "sunlight-points" => Ok(Currency::Sunlight),
            _ => Err(CoreError::invalid_input(
                "currency",
                format!("unknown currency '{s}' (expected water or sunlight)"),
            )),
        }
    }
}

/// Why a reward was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardReason {
    TaskCompleted,
    FocusSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEvent {
    pub currency: Currency,
    pub amount: u64,
    pub reason: RewardReason,
}

/// Reward for a task flipping to completed: 2 sunlight for long tasks, else 1 water.
pub fn task_completion_reward(time_allocated: u32) -> RewardEvent {
    let (currency, amount) = if time_allocated >= LONG_TASK_MIN {
        (Currency::Sunlight, 2)
    } else {
        (Currency::Water, 1)
    };
    RewardEvent {
        currency,
        amount,
        reason: RewardReason::TaskCompleted,
    }
}

/// Reward for a focus session running to zero: 3 sunlight for long sessions, else 2.
pub fn focus_session_reward(time_allocated: u32) -> RewardEvent {
    RewardEvent {
        currency: Currency::Sunlight,
        amount: if time_allocated >= LONG_FOCUS_MIN { 3 } else { 2 },
        reason: RewardReason::FocusSession,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardLedger {
    #[serde(default)]
    pub water_drops: u64,
    #[serde(default)]
    pub sunlight_points: u64,
}

impl RewardLedger {
    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Water => self.water_drops,
            Currency::Sunlight => self.sunlight_points,
        }
    }

    fn counter_mut(&mut self, currency: Currency) -> &mut u64 {
        match currency {
            Currency::Water => &mut self.water_drops,
            Currency::Sunlight => &mut self.sunlight_points,
        }
    }

    /// Add `amount` to `currency`. Returns the new balance.
    ///
    /// # Errors
    /// `InvalidInput` when `amount` is zero.
    pub fn grant(&mut self, currency: Currency, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Err(CoreError::invalid_input("amount", "grant amount must be positive"));
        }
        let counter = self.counter_mut(currency);
        *counter = counter.saturating_add(amount);
        Ok(*counter)
    }

    /// Take `amount` from `currency` if the balance covers it. Returns the new balance.
    ///
    /// # Errors
    /// `InsufficientFunds` when the balance is too low (nothing is deducted),
    /// `InvalidInput` when `amount` is zero.
    pub fn spend(&mut self, currency: Currency, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Err(CoreError::invalid_input("amount", "spend amount must be positive"));
        }
        let counter = self.counter_mut(currency);
        if *counter < amount {
            return Err(CoreError::InsufficientFunds {
                currency,
                needed: amount,
                available: *counter,
            });
        }
        *counter -= amount;
        Ok(*counter)
    }

    pub fn apply(&mut self, event: &RewardEvent) -> Result<u64> {
        self.grant(event.currency, event.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spend_more_than_balance_fails_without_change() {
        let mut ledger = RewardLedger::default();
        ledger.grant(Currency::Water, 3).unwrap();
        let err = ledger.spend(Currency::Water, 5).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientFunds {
                currency: Currency::Water,
                needed: 5,
                available: 3
            }
        ));
        assert_eq!(ledger.water_drops, 3);
    }

    #[test]
    fn zero_amounts_are_rejected() {
        let mut ledger = RewardLedger::default();
        assert!(ledger.grant(Currency::Sunlight, 0).is_err());
        assert!(ledger.spend(Currency::Sunlight, 0).is_err());
    }

    #[test]
    fn unknown_currency_is_invalid_input() {
        assert_eq!("sun".parse::<Currency>().unwrap(), Currency::Sunlight);
        assert_eq!("Water".parse::<Currency>().unwrap(), Currency::Water);
        assert!(matches!(
            "gold".parse::<Currency>(),
            Err(CoreError::InvalidInput { .. })
        ));
    }

    #[test]
    fn ledger_uses_stored_field_names() {
        let ledger = RewardLedger {
            water_drops: 4,
            sunlight_points: 9,
        };
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"{"waterDrops":4,"sunlightPoints":9}"#);
    }

    #[test]
    fn completion_reward_thresholds() {
        assert_eq!(task_completion_reward(29).currency, Currency::Water);
        assert_eq!(task_completion_reward(29).amount, 1);
        assert_eq!(task_completion_reward(30).currency, Currency::Sunlight);
        assert_eq!(task_completion_reward(30).amount, 2);
        assert_eq!(focus_session_reward(24).amount, 2);
        assert_eq!(focus_session_reward(25).amount, 3);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Grant(bool, u64),
        Spend(bool, u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (any::<bool>(), 1u64..20).prop_map(|(w, n)| Op::Grant(w, n)),
            (any::<bool>(), 1u64..30).prop_map(|(w, n)| Op::Spend(w, n)),
        ]
    }

    fn currency(water: bool) -> Currency {
        if water {
            Currency::Water
        } else {
            Currency::Sunlight
        }
    }

    proptest! {
        #[test]
        fn spend_never_overdraws(ops in proptest::collection::vec(op(), 0..64)) {
            let mut ledger = RewardLedger::default();
            let (mut water, mut sun) = (0i64, 0i64);
            for op in ops {
                match op {
                    Op::Grant(w, n) => {
                        ledger.grant(currency(w), n).unwrap();
                        if w { water += n as i64 } else { sun += n as i64 }
                    }
                    Op::Spend(w, n) => {
                        let before = ledger.balance(currency(w));
                        match ledger.spend(currency(w), n) {
                            Ok(after) => {
                                prop_assert_eq!(after, before - n);
                                if w { water -= n as i64 } else { sun -= n as i64 }
                            }
                            Err(_) => prop_assert_eq!(ledger.balance(currency(w)), before),
                        }
                    }
                }
                prop_assert!(water >= 0 && sun >= 0);
                prop_assert_eq!(ledger.water_drops as i64, water);
                prop_assert_eq!(ledger.sunlight_points as i64, sun);
            }
        }

        #[test]
        fn completion_reward_is_pure_in_minutes(minutes in 1u32..600) {
            let a = task_completion_reward(minutes);
            let b = task_completion_reward(minutes);
            prop_assert_eq!(a, b);
            if minutes >= 30 {
                prop_assert_eq!((a.currency, a.amount), (Currency::Sunlight, 2));
            } else {
                prop_assert_eq!((a.currency, a.amount), (Currency::Water, 1));
            }
        }
    }
}
