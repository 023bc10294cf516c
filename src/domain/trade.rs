//! Trade candidates and the strategy-side selectors that price them.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Direction of the holding strategy.
///
/// Selects the realized gain/loss sign convention and the financing lookup:
/// long positions pay a single-day rate, short positions pay a lookback
/// aggregate over the holding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Realized gain/loss for a position entered at `position_size` and
    /// closed for `sale_proceeds`.
    pub fn realized_gain(self, position_size: f64, sale_proceeds: f64) -> f64 {
        match self {
            Side::Long => sale_proceeds - position_size,
            Side::Short => position_size - sale_proceeds,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Side::Long),
            "short" => Ok(Side::Short),
            other => Err(format!("unknown side '{other}' (expected long or short)")),
        }
    }
}

/// Which price field a position is entered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPrice {
    /// Same-day entry at the current open.
    Open,
    /// Entry at the prior session's close.
    PreviousClose,
    /// Entry at the close N trading days before the trade date, for
    /// multi-day holding variants.
    LookbackClose,
}

impl EntryPrice {
    /// Trade-log column that must be present for this basis.
    pub fn column(self) -> &'static str {
        match self {
            EntryPrice::Open => "Open",
            EntryPrice::PreviousClose => "Previous_Close",
            EntryPrice::LookbackClose => "Previous_Close_7D",
        }
    }
}

impl fmt::Display for EntryPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPrice::Open => write!(f, "open"),
            EntryPrice::PreviousClose => write!(f, "previous_close"),
            EntryPrice::LookbackClose => write!(f, "lookback_close"),
        }
    }
}

impl FromStr for EntryPrice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(EntryPrice::Open),
            "previous_close" => Ok(EntryPrice::PreviousClose),
            "lookback_close" => Ok(EntryPrice::LookbackClose),
            other => Err(format!(
                "unknown entry price '{other}' (expected open, previous_close or lookback_close)"
            )),
        }
    }
}

/// One row of the trade log: a candidate position for one instrument on one date.
///
/// Price and volume cells may be blank in the source; a row that cannot be
/// priced is skipped by the engine rather than rejected at load.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeCandidate {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub previous_close: Option<f64>,
    pub lookback_close: Option<f64>,
    pub volume: Option<f64>,
    pub adv20: Option<f64>,
    pub volatility: Option<f64>,
    pub index_name: Option<String>,
    pub event_type: Option<String>,
    pub holding_day: Option<u32>,
}

impl TradeCandidate {
    /// Entry price for the given basis, if the row carries a usable value.
    pub fn entry_price(&self, basis: EntryPrice) -> Option<f64> {
        let price = match basis {
            EntryPrice::Open => self.open,
            EntryPrice::PreviousClose => self.previous_close,
            EntryPrice::LookbackClose => self.lookback_close,
        };
        price.filter(|p| p.is_finite())
    }

    /// Exit price: the trade date's close.
    pub fn exit_price(&self) -> Option<f64> {
        self.close.filter(|p| p.is_finite())
    }
}
