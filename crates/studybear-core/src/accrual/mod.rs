mod engine;
mod ticker;

pub use engine::{
    now_ms, AccrualEngine, TickReport, DEFAULT_OPTIMISTIC_CAP_MS, DEFAULT_TICK_PERIOD_MS,
};
pub use ticker::Ticker;

/// Balance milliseconds per currency unit.
pub const MS_PER_UNIT: u64 = 60 * 1000;

/// Whole currency units earned by a raw millisecond balance.
///
/// Only used for display and threshold checks; accrual and debits always
/// work in raw milliseconds.
pub fn earned_units(balance_ms: u64) -> u64 {
    balance_ms / MS_PER_UNIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_floor_at_minute_boundary() {
        assert_eq!(earned_units(0), 0);
        assert_eq!(earned_units(59_999), 0);
        assert_eq!(earned_units(60_000), 1);
        assert_eq!(earned_units(599_999), 9);
        assert_eq!(earned_units(600_000), 10);
    }
}
