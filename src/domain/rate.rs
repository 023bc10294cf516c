//! Financing rate series and lookups.
//!
//! Rates are quoted in percent (a SOFR print of 5.31 means 5.31%). A daily
//! cost rate is `(rate / 100 + spread) / 365`.

use chrono::NaiveDate;

/// Calendar days used to convert an annual rate into a daily one.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Spread over the reference rate charged on long financing.
pub const LONG_FINANCING_SPREAD: f64 = 0.015;

/// Spread over the reference rate charged on short financing.
pub const SHORT_FINANCING_SPREAD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// Convert a percent rate into a daily cost rate.
pub fn daily_cost_rate(rate_pct: f64, spread: f64) -> f64 {
    (rate_pct / 100.0 + spread) / DAYS_PER_YEAR
}

/// A date-ordered financing rate series. Always sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSeries {
    points: Vec<RatePoint>,
}

impl RateSeries {
    /// Build a series, sorting by date. The sort is stable so later
    /// duplicates of a date win in [`RateSeries::latest_rate`].
    pub fn new(mut points: Vec<RatePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    /// Number of entries dated on or before `date`.
    fn count_on_or_before(&self, date: NaiveDate) -> usize {
        self.points.partition_point(|p| p.date <= date)
    }

    /// Latest entry whose date is on or before `date`.
    pub fn latest_rate(&self, date: NaiveDate) -> Option<RatePoint> {
        let n = self.count_on_or_before(date);
        if n == 0 {
            None
        } else {
            Some(self.points[n - 1])
        }
    }

    /// Sum of daily cost rates over the `window` most recent entries on or
    /// before `date`.
    ///
    /// If fewer than `window` entries are available, the missing earliest
    /// slots repeat the oldest available rate. Returns `None` when no entry
    /// precedes `date` or `window` is zero.
    pub fn lookback_rate(&self, date: NaiveDate, window: usize, spread: f64) -> Option<f64> {
        let n = self.count_on_or_before(date);
        if n == 0 || window == 0 {
            return None;
        }

        let start = n.saturating_sub(window);
        let available = &self.points[start..n];
        let padding = window - available.len();
        let oldest = available[0].rate;

        let padded: f64 = daily_cost_rate(oldest, spread) * padding as f64;
        let observed: f64 = available
            .iter()
            .map(|p| daily_cost_rate(p.rate, spread))
            .sum();
        Some(padded + observed)
    }
}
