//! Portfolio performance metrics over a snapshot series.
//!
//! Daily P&L is `RGL - transaction costs - overnight cost - slippage`.
//! Ratios whose denominator is zero, or that need more observations than the
//! series has, are reported as `None`.

use super::portfolio::DailySnapshot;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// The columns of a snapshot row that metrics consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PnlRow {
    pub total_position_size: f64,
    pub daily_pnl: f64,
}

impl From<&DailySnapshot> for PnlRow {
    fn from(s: &DailySnapshot) -> Self {
        PnlRow {
            total_position_size: s.total_position_size,
            daily_pnl: s.daily_net_pnl(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioMetrics {
    pub information_ratio: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub annualized_return: Option<f64>,
    pub margin: Option<f64>,
    pub turnover: Option<f64>,
    pub trading_days: usize,
    pub total_pnl: f64,
}

impl PortfolioMetrics {
    pub fn compute(snapshots: &[DailySnapshot]) -> Self {
        let rows: Vec<PnlRow> = snapshots.iter().map(PnlRow::from).collect();
        Self::from_rows(&rows)
    }

    pub fn from_rows(rows: &[PnlRow]) -> Self {
        let n = rows.len();
        let pnl: Vec<f64> = rows.iter().map(|r| r.daily_pnl).collect();
        let total_pnl: f64 = pnl.iter().sum();
        let total_position: f64 = rows.iter().map(|r| r.total_position_size).sum();
        let avg_position = if n > 0 {
            Some(total_position / n as f64)
        } else {
            None
        };

        let information_ratio = information_ratio(&pnl);
        let sharpe_ratio = information_ratio.map(|ir| TRADING_DAYS_PER_YEAR.sqrt() * ir);

        let max_drawdown = match (min_value(&pnl), avg_position) {
            (Some(worst), Some(avg)) => ratio(worst, avg),
            _ => None,
        };

        let annualized_return = if n > 0 {
            ratio(total_pnl * (TRADING_DAYS_PER_YEAR / n as f64), total_position)
        } else {
            None
        };

        let margin = if n > 0 {
            ratio(total_pnl, total_position)
        } else {
            None
        };
        let turnover = avg_position.and_then(|avg| ratio(avg, total_position));

        PortfolioMetrics {
            information_ratio,
            sharpe_ratio,
            max_drawdown,
            annualized_return,
            margin,
            turnover,
            trading_days: n,
            total_pnl,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

fn min_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Mean over sample standard deviation (n - 1).
fn information_ratio(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();
    if stddev > 0.0 {
        Some(mean / stddev)
    } else {
        None
    }
}
