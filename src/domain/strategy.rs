//! Strategy variant configuration.

use super::trade::{EntryPrice, Side};

/// Default holding period for short runs.
pub const DEFAULT_HOLDING_PERIOD: u32 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub side: Side,
    pub entry: EntryPrice,
    pub holding_period: u32,
}

impl StrategyConfig {
    /// Trading days of financing charged to a short position: every night of
    /// the holding period except the entry day.
    pub fn financing_window(&self) -> usize {
        self.holding_period.saturating_sub(1).max(1) as usize
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            side: Side::Long,
            entry: EntryPrice::Open,
            holding_period: 1,
        }
    }
}
