//! Daily trade processing: liquidity caps, capital rationing, costs.
//!
//! Steps for one date's batch:
//! 1. size limit = 1% of ADV20
//! 2. trade limit = min(size limit, traded volume), or whichever is known
//! 3. position size = trade limit * entry price
//! 4. pro-rata scale positions and trade limits down to the portfolio cap
//! 5. sale proceeds = trade limit * close
//! 6. realized gain/loss by side
//! 7. transaction cost = 2 * trade limit * 0.01
//! 8. slippage

use super::slippage::{SlippageParams, slippage_cost, total_slippage};
use super::trade::{EntryPrice, Side, TradeCandidate};

/// Fraction of ADV20 a single position may take.
pub const PARTICIPATION_CAP: f64 = 0.01;

/// Cost per unit traded, charged on entry and on exit.
pub const COST_PER_UNIT: f64 = 0.01;

pub const DEFAULT_PORTFOLIO_CAP: f64 = 5_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionParams {
    pub portfolio_cap: f64,
    pub slippage: SlippageParams,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        ExecutionParams {
            portfolio_cap: DEFAULT_PORTFOLIO_CAP,
            slippage: SlippageParams::default(),
        }
    }
}

/// A candidate after sizing and costing.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedTrade {
    pub ticker: String,
    pub size_limit: Option<f64>,
    pub trade_limit: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub position_size: f64,
    pub sale_proceeds: f64,
    pub rgl: f64,
    pub transaction_cost: f64,
    pub slippage_cost: Option<f64>,
}

/// Aggregates over one date's sized batch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchTotals {
    pub position_size: f64,
    pub sale_proceeds: f64,
    pub rgl: f64,
    pub transaction_costs: f64,
    pub slippage_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedBatch {
    pub trades: Vec<SizedTrade>,
    pub totals: BatchTotals,
    /// Candidates dropped because their entry price was missing.
    pub skipped: usize,
    /// Factor applied to every position, 1.0 when under the cap.
    pub scale_factor: f64,
}

/// Size limit from ADV20: `None` when ADV20 is unknown.
pub fn size_limit(adv20: Option<f64>) -> Option<f64> {
    adv20.filter(|a| a.is_finite()).map(|a| a * PARTICIPATION_CAP)
}

/// Trade limit: the lesser of the size limit and the traded volume.
/// When only one of the two is known it is used alone; `None` when neither is.
pub fn trade_limit(size_limit: Option<f64>, volume: Option<f64>) -> Option<f64> {
    let volume = volume.filter(|v| v.is_finite());
    match (size_limit, volume) {
        (Some(limit), Some(volume)) => Some(limit.min(volume)),
        (Some(limit), None) => Some(limit),
        (None, Some(volume)) => Some(volume),
        (None, None) => None,
    }
}

/// Round-trip transaction cost for `trade_limit` units.
pub fn transaction_cost(trade_limit: f64) -> f64 {
    2.0 * trade_limit * COST_PER_UNIT
}

/// Factor that brings `total_position_size` down to `portfolio_cap`.
pub fn cap_scale_factor(total_position_size: f64, portfolio_cap: f64) -> f64 {
    if total_position_size > portfolio_cap {
        portfolio_cap / total_position_size
    } else {
        1.0
    }
}

fn skip(candidate: &TradeCandidate, reason: &str) {
    log::warn!("skipping {} on {}: {}", candidate.ticker, candidate.date, reason);
}

/// Size, ration and cost one date's batch of candidates.
///
/// Rows that cannot be priced are left out and counted in `skipped`.
pub fn process_batch(
    batch: &[TradeCandidate],
    params: &ExecutionParams,
    side: Side,
    entry: EntryPrice,
) -> ProcessedBatch {
    let mut skipped = 0usize;
    let mut sized: Vec<(SizedTrade, &TradeCandidate)> = Vec::with_capacity(batch.len());

    for candidate in batch {
        let Some(entry_price) = candidate.entry_price(entry) else {
            skip(candidate, &format!("no {entry} entry price"));
            skipped += 1;
            continue;
        };
        let Some(exit_price) = candidate.exit_price() else {
            skip(candidate, "no close price");
            skipped += 1;
            continue;
        };

        let limit = size_limit(candidate.adv20);
        let Some(units) = trade_limit(limit, candidate.volume) else {
            skip(candidate, "neither ADV20 nor volume");
            skipped += 1;
            continue;
        };
        sized.push((
            SizedTrade {
                ticker: candidate.ticker.clone(),
                size_limit: limit,
                trade_limit: units,
                entry_price,
                exit_price,
                position_size: units * entry_price,
                sale_proceeds: 0.0,
                rgl: 0.0,
                transaction_cost: 0.0,
                slippage_cost: None,
            },
            candidate,
        ));
    }

    let total: f64 = sized.iter().map(|(t, _)| t.position_size).sum();
    let scale_factor = cap_scale_factor(total, params.portfolio_cap);

    let trades: Vec<SizedTrade> = sized
        .into_iter()
        .map(|(mut t, candidate)| {
            t.position_size *= scale_factor;
            t.trade_limit *= scale_factor;
            t.sale_proceeds = t.trade_limit * t.exit_price;
            t.rgl = side.realized_gain(t.position_size, t.sale_proceeds);
            t.transaction_cost = transaction_cost(t.trade_limit);
            t.slippage_cost = slippage_cost(
                t.trade_limit,
                candidate.adv20,
                candidate.volatility,
                t.entry_price,
                t.exit_price,
                &params.slippage,
            );
            if t.slippage_cost.is_none() {
                log::debug!(
                    "{} on {}: slippage not priced (ADV20 or volatility missing)",
                    t.ticker,
                    candidate.date
                );
            }
            t
        })
        .collect();

    let totals = BatchTotals {
        position_size: trades.iter().map(|t| t.position_size).sum(),
        sale_proceeds: trades.iter().map(|t| t.sale_proceeds).sum(),
        rgl: trades.iter().map(|t| t.rgl).sum(),
        transaction_costs: trades.iter().map(|t| t.transaction_cost).sum(),
        slippage_cost: total_slippage(&trades),
    };

    ProcessedBatch {
        trades,
        totals,
        skipped,
        scale_factor,
    }
}
