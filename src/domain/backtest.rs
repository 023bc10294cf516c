//! Backtest engine and date loop.
//!
//! One forward pass over the trade log's dates in ascending order. Each date
//! is sized and costed independently; the only state carried between dates
//! is the cumulative net P&L held by the [`PortfolioLedger`].

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::execution::{ExecutionParams, process_batch};
use super::financing::{FinancingConfig, financing_cost};
use super::portfolio::{DailySnapshot, PortfolioLedger};
use super::rate::RateSeries;
use super::strategy::StrategyConfig;
use super::trade::TradeCandidate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestConfig {
    pub strategy: StrategyConfig,
    pub execution: ExecutionParams,
    pub financing: FinancingConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub snapshots: Vec<DailySnapshot>,
    pub skipped_rows: usize,
    pub days_without_rate: usize,
}

impl BacktestResult {
    pub fn final_cumulative_pnl(&self) -> f64 {
        self.snapshots
            .last()
            .map(|s| s.cumulative_net_pnl)
            .unwrap_or(0.0)
    }
}

/// Group candidates by trade date, ascending.
pub fn batches_by_date(trade_log: &[TradeCandidate]) -> BTreeMap<NaiveDate, Vec<TradeCandidate>> {
    let mut batches: BTreeMap<NaiveDate, Vec<TradeCandidate>> = BTreeMap::new();
    for candidate in trade_log {
        batches
            .entry(candidate.date)
            .or_default()
            .push(candidate.clone());
    }
    batches
}

pub struct BacktestEngine<'a> {
    config: BacktestConfig,
    rates: &'a RateSeries,
    ledger: PortfolioLedger,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(config: BacktestConfig, rates: &'a RateSeries) -> Self {
        Self {
            config,
            rates,
            ledger: PortfolioLedger::new(),
        }
    }

    pub fn cumulative_net_pnl(&self) -> f64 {
        self.ledger.cumulative_net_pnl()
    }

    /// Simulate one trading date. Dates must be fed in ascending order.
    pub fn step(&mut self, date: NaiveDate, batch: &[TradeCandidate]) -> &DailySnapshot {
        debug_assert!(
            self.ledger.last().is_none_or(|s| s.date < date),
            "dates must be strictly ascending"
        );

        let strategy = &self.config.strategy;
        let processed = process_batch(batch, &self.config.execution, strategy.side, strategy.entry);
        let financing = financing_cost(
            self.rates,
            date,
            strategy.side,
            strategy.financing_window(),
            processed.totals.position_size,
            &self.config.financing,
        );

        self.ledger
            .record(date, &processed.totals, financing, processed.skipped)
    }

    /// Run every date of the trade log and return the snapshot series.
    pub fn run(mut self, trade_log: &[TradeCandidate]) -> Vec<DailySnapshot> {
        for (date, batch) in batches_by_date(trade_log) {
            self.step(date, &batch);
        }
        log::debug!("cumulative net P&L {:.2}", self.cumulative_net_pnl());
        self.ledger.into_snapshots()
    }
}

pub fn run_backtest(
    trade_log: &[TradeCandidate],
    rates: &RateSeries,
    config: &BacktestConfig,
) -> BacktestResult {
    let snapshots = BacktestEngine::new(config.clone(), rates).run(trade_log);
    let skipped_rows = snapshots.iter().map(|s| s.skipped_rows).sum();
    let days_without_rate = snapshots
        .iter()
        .filter(|s| !s.financing.is_available())
        .count();

    if days_without_rate > 0 {
        log::warn!("{days_without_rate} trading days had no financing rate");
    }

    BacktestResult {
        snapshots,
        skipped_rows,
        days_without_rate,
    }
}
