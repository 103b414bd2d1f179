//! Presence accrual engine.
//!
//! The engine is a wall-clock-based state machine with no internal thread.
//! The caller invokes [`AccrualEngine::tick`] once per tick period with the
//! current time; each member remembers when a tick last saw them studying,
//! and the next tick credits the gap since then.
//!
//! ## Per-member transitions
//!
//! ```text
//! studying, last_seen = Some(t)  -> credit min(now - t, cap), last_seen = Some(now)
//! studying, last_seen = None     -> credit 0 (baseline),      last_seen = Some(now)
//! not studying                   -> credit 0,                 last_seen = None
//! ```
//!
//! Because `last_seen` is persisted, a member who was studying when the
//! process stopped and is studying again after it restarts gets the whole
//! outage credited, bounded by the optimistic cap.

use serde::{Deserialize, Serialize};

use crate::registry::StudentRegistry;

/// Default tick period in milliseconds.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1000;

/// Default upper bound on the time credited for a single gap.
pub const DEFAULT_OPTIMISTIC_CAP_MS: u64 = 5 * 60 * 1000;

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickReport {
    /// The single timestamp used for every member in this tick.
    pub at_ms: u64,
    /// Members that were studying.
    pub studying: usize,
    /// Sum of credited milliseconds across members.
    pub credited_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualEngine {
    optimistic_cap_ms: u64,
}

impl Default for AccrualEngine {
    fn default() -> Self {
        Self::new(DEFAULT_OPTIMISTIC_CAP_MS)
    }
}

impl AccrualEngine {
    pub fn new(optimistic_cap_ms: u64) -> Self {
        Self { optimistic_cap_ms }
    }

    pub fn optimistic_cap_ms(&self) -> u64 {
        self.optimistic_cap_ms
    }

    /// Run one accrual pass over every member using `now_ms` for all of them.
    pub fn tick(&self, registry: &mut StudentRegistry, now_ms: u64) -> TickReport {
        let mut report = TickReport {
            at_ms: now_ms,
            ..TickReport::default()
        };

        for member in registry.all_mut() {
            if !member.is_studying {
                member.last_seen_ms = None;
                continue;
            }

            report.studying += 1;
            if let Some(last) = member.last_seen_ms {
                // A clock stepping backwards credits nothing rather than wrapping.
                let delta = now_ms.saturating_sub(last).min(self.optimistic_cap_ms);
                member.total_time = member.total_time.saturating_add(delta);
                member.balance = member.balance.saturating_add(delta);
                report.credited_ms = report.credited_ms.saturating_add(delta);
                if delta == self.optimistic_cap_ms {
                    tracing::debug!(member = %member.id, gap_ms = now_ms.saturating_sub(last), "gap clamped to optimistic cap");
                }
            }
            member.last_seen_ms = Some(now_ms);
        }

        tracing::trace!(
            at_ms = report.at_ms,
            studying = report.studying,
            credited_ms = report.credited_ms,
            "accrual tick"
        );
        report
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TrackedMember;

    fn registry_with(members: Vec<TrackedMember>) -> StudentRegistry {
        StudentRegistry::from_members(members)
    }

    #[test]
    fn studying_member_with_baseline_accrues_gap() {
        let mut reg = registry_with(vec![TrackedMember::new("a", 0)]);
        let report = AccrualEngine::default().tick(&mut reg, 1000);
        let a = reg.find("a").unwrap();
        assert_eq!(a.total_time, 1000);
        assert_eq!(a.balance, 1000);
        assert_eq!(a.last_seen_ms, Some(1000));
        assert_eq!(report.studying, 1);
        assert_eq!(report.credited_ms, 1000);
    }

    #[test]
    fn missing_baseline_only_sets_it() {
        let mut m = TrackedMember::new("a", 0);
        m.last_seen_ms = None;
        let mut reg = registry_with(vec![m]);
        AccrualEngine::default().tick(&mut reg, 5000);
        let a = reg.find("a").unwrap();
        assert_eq!(a.total_time, 0);
        assert_eq!(a.last_seen_ms, Some(5000));
    }

    #[test]
    fn not_studying_clears_baseline_and_accrues_nothing() {
        let mut m = TrackedMember::new("a", 0);
        m.is_studying = false;
        m.total_time = 77;
        let mut reg = registry_with(vec![m]);
        let report = AccrualEngine::default().tick(&mut reg, 1000);
        let a = reg.find("a").unwrap();
        assert_eq!(a.total_time, 77);
        assert_eq!(a.last_seen_ms, None);
        assert_eq!(report.studying, 0);
    }

    #[test]
    fn long_gap_is_clamped_to_cap() {
        let mut reg = registry_with(vec![TrackedMember::new("a", 0)]);
        AccrualEngine::default().tick(&mut reg, 3 * 60 * 60 * 1000);
        let a = reg.find("a").unwrap();
        assert_eq!(a.total_time, DEFAULT_OPTIMISTIC_CAP_MS);
        assert_eq!(a.balance, DEFAULT_OPTIMISTIC_CAP_MS);
    }

    #[test]
    fn custom_cap_is_honoured() {
        let mut reg = registry_with(vec![TrackedMember::new("a", 0)]);
        AccrualEngine::new(2_000).tick(&mut reg, 10_000);
        assert_eq!(reg.find("a").unwrap().total_time, 2_000);
    }

    #[test]
    fn clock_going_backwards_credits_nothing() {
        let mut reg = registry_with(vec![TrackedMember::new("a", 10_000)]);
        AccrualEngine::default().tick(&mut reg, 9_000);
        let a = reg.find("a").unwrap();
        assert_eq!(a.total_time, 0);
        assert_eq!(a.last_seen_ms, Some(9_000));
    }

    #[test]
    fn continuous_presence_over_n_ticks() {
        let mut reg = registry_with(vec![TrackedMember::new("a", 0)]);
        reg.find_mut("a").unwrap().last_seen_ms = None;

        let engine = AccrualEngine::default();
        let n = 10u64;
        for i in 0..n {
            engine.tick(&mut reg, 50_000 + i * DEFAULT_TICK_PERIOD_MS);
        }
        assert_eq!(reg.find("a").unwrap().total_time, (n - 1) * DEFAULT_TICK_PERIOD_MS);
    }

    #[test]
    fn every_member_uses_the_same_timestamp() {
        let mut reg = registry_with(vec![
            TrackedMember::new("a", 100),
            TrackedMember::new("b", 400),
        ]);
        AccrualEngine::default().tick(&mut reg, 1000);
        assert_eq!(reg.find("a").unwrap().last_seen_ms, Some(1000));
        assert_eq!(reg.find("b").unwrap().last_seen_ms, Some(1000));
        assert_eq!(reg.find("a").unwrap().total_time, 900);
        assert_eq!(reg.find("b").unwrap().total_time, 600);
    }
}
