//! Queries and the one mutating operation offered to the command layer.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::accrual::earned_units;
use crate::events::Event;
use crate::registry::{SharedRegistry, StudentRegistry};
use crate::storage::RewardPricing;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub id: String,
    pub total_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RedeemOutcome {
    Redeemed {
        debited_ms: u64,
        remaining_units: u64,
    },
    InsufficientFunds {
        balance_units: u64,
        cost_units: u64,
    },
}

/// Spendable units for `id`; zero for members never seen.
pub fn balance_of(registry: &StudentRegistry, id: &str) -> u64 {
    registry
        .find(id)
        .map(|m| earned_units(m.balance))
        .unwrap_or(0)
}

/// Members ordered by lifetime study time, highest first.
///
/// The sort is stable, so equal totals keep registry order. The registry
/// itself is left untouched.
pub fn leaderboard(registry: &StudentRegistry) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(&str, u64)> = registry
        .all()
        .iter()
        .map(|m| (m.id.as_str(), m.total_time))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.into_iter()
        .enumerate()
        .map(|(i, (id, total_time_ms))| LeaderboardEntry {
            rank: i + 1,
            id: id.to_string(),
            total_time_ms,
        })
        .collect()
}

/// Charge one reward to `id`.
///
/// The threshold is checked in units but the debit is the fixed
/// millisecond price, whatever the unit conversion says.
pub fn redeem(registry: &mut StudentRegistry, id: &str, pricing: RewardPricing) -> RedeemOutcome {
    let balance_units = balance_of(registry, id);
    let member = match registry.find_mut(id) {
        Some(member) if balance_units >= pricing.cost_units => member,
        _ => {
            return RedeemOutcome::InsufficientFunds {
                balance_units,
                cost_units: pricing.cost_units,
            }
        }
    };
    member.balance = member.balance.saturating_sub(pricing.cost_ms);
    RedeemOutcome::Redeemed {
        debited_ms: pricing.cost_ms,
        remaining_units: earned_units(member.balance),
    }
}

/// Command-layer view of the shared registry.
#[derive(Debug, Clone)]
pub struct CommandFacade {
    registry: SharedRegistry,
    pricing: RewardPricing,
}

impl CommandFacade {
    pub fn new(registry: SharedRegistry, pricing: RewardPricing) -> Self {
        Self { registry, pricing }
    }

    pub fn pricing(&self) -> RewardPricing {
        self.pricing
    }

    pub fn balance_of(&self, id: &str) -> u64 {
        balance_of(&self.registry.lock(), id)
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        leaderboard(&self.registry.lock())
    }

    pub fn redeem(&self, id: &str) -> (RedeemOutcome, Event) {
        let outcome = redeem(&mut self.registry.lock(), id, self.pricing);
        let at = Utc::now();
        let event = match outcome {
            RedeemOutcome::Redeemed {
                debited_ms,
                remaining_units,
            } => {
                tracing::info!(member = %id, debited_ms, remaining_units, "reward redeemed");
                Event::Redeemed {
                    member_id: id.to_string(),
                    debited_ms,
                    remaining_units,
                    at,
                }
            }
            RedeemOutcome::InsufficientFunds {
                balance_units,
                cost_units,
            } => {
                tracing::debug!(member = %id, balance_units, cost_units, "redeem refused");
                Event::RedeemRejected {
                    member_id: id.to_string(),
                    balance_units,
                    cost_units,
                    at,
                }
            }
        };
        (outcome, event)
    }
}
