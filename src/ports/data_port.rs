//! Data access port trait: trade log and financing rates.

use crate::domain::error::IdxtraderError;
use crate::domain::rate::RateSeries;
use crate::domain::trade::{EntryPrice, TradeCandidate};

pub trait DataPort {
    /// Load every trade candidate. Fails if a column required by `entry`
    /// (or by every run) is absent.
    fn load_trade_log(&self, entry: EntryPrice) -> Result<Vec<TradeCandidate>, IdxtraderError>;

    /// Load the financing rate series, sorted ascending by date.
    fn load_rates(&self) -> Result<RateSeries, IdxtraderError>;
}
