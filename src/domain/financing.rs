//! Overnight financing cost for a day's aggregate position.

use chrono::NaiveDate;

use super::rate::{
    RateSeries, LONG_FINANCING_SPREAD, SHORT_FINANCING_SPREAD, daily_cost_rate,
};
use super::trade::Side;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancingConfig {
    pub long_spread: f64,
    pub short_spread: f64,
}

impl Default for FinancingConfig {
    fn default() -> Self {
        FinancingConfig {
            long_spread: LONG_FINANCING_SPREAD,
            short_spread: SHORT_FINANCING_SPREAD,
        }
    }
}

/// Why no financing rate could be applied on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnavailable {
    EmptySeries,
    NoRateOnOrBefore(NaiveDate),
}

/// Outcome of pricing one day's financing.
///
/// `Unavailable` is distinct from a zero charge so results stay auditable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FinancingCost {
    Charged { cost_rate: f64, cost: f64 },
    Unavailable(RateUnavailable),
}

impl FinancingCost {
    /// Amount deducted from daily P&L. Zero when no rate was available.
    pub fn amount(&self) -> f64 {
        match self {
            FinancingCost::Charged { cost, .. } => *cost,
            FinancingCost::Unavailable(_) => 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FinancingCost::Charged { .. })
    }
}

/// Price overnight financing on `total_position_size` for `date`.
///
/// Long positions pay the single latest rate. Short positions pay the
/// lookback aggregate over `window` trading days.
pub fn financing_cost(
    rates: &RateSeries,
    date: NaiveDate,
    side: Side,
    window: usize,
    total_position_size: f64,
    config: &FinancingConfig,
) -> FinancingCost {
    let cost_rate = match side {
        Side::Long => rates
            .latest_rate(date)
            .map(|p| daily_cost_rate(p.rate, config.long_spread)),
        Side::Short => rates.lookback_rate(date, window, config.short_spread),
    };

    match cost_rate {
        Some(cost_rate) => FinancingCost::Charged {
            cost_rate,
            cost: cost_rate * total_position_size,
        },
        None => {
            let reason = if rates.is_empty() {
                RateUnavailable::EmptySeries
            } else {
                RateUnavailable::NoRateOnOrBefore(date)
            };
            log::warn!("no financing rate for {date} ({side}); financing cost treated as zero");
            FinancingCost::Unavailable(reason)
        }
    }
}
