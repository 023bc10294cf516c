//! Per-date portfolio snapshots and the running P&L ledger.

use chrono::NaiveDate;

use super::execution::BatchTotals;
use super::financing::FinancingCost;

/// One trading date's portfolio aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub total_position_size: f64,
    pub total_sale_proceeds: f64,
    pub rgl: f64,
    pub transaction_costs: f64,
    pub slippage_cost: f64,
    pub overnight_cost: f64,
    pub cumulative_net_pnl: f64,
    pub financing: FinancingCost,
    pub skipped_rows: usize,
}

impl DailySnapshot {
    /// RGL less transaction, slippage and overnight costs.
    pub fn daily_net_pnl(&self) -> f64 {
        self.rgl - self.transaction_costs - self.slippage_cost - self.overnight_cost
    }
}

/// Append-only snapshot history with the running cumulative net P&L.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioLedger {
    cumulative_net_pnl: f64,
    snapshots: Vec<DailySnapshot>,
}

impl PortfolioLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cumulative_net_pnl(&self) -> f64 {
        self.cumulative_net_pnl
    }

    pub fn last(&self) -> Option<&DailySnapshot> {
        self.snapshots.last()
    }

    pub fn into_snapshots(self) -> Vec<DailySnapshot> {
        self.snapshots
    }

    /// Book one date's totals and financing, returning the new snapshot.
    pub fn record(
        &mut self,
        date: NaiveDate,
        totals: &BatchTotals,
        financing: FinancingCost,
        skipped_rows: usize,
    ) -> &DailySnapshot {
        let overnight_cost = financing.amount();
        let daily_net_pnl =
            totals.rgl - totals.transaction_costs - totals.slippage_cost - overnight_cost;
        self.cumulative_net_pnl += daily_net_pnl;

        self.snapshots.push(DailySnapshot {
            date,
            total_position_size: totals.position_size,
            total_sale_proceeds: totals.sale_proceeds,
            rgl: totals.rgl,
            transaction_costs: totals.transaction_costs,
            slippage_cost: totals.slippage_cost,
            overnight_cost,
            cumulative_net_pnl: self.cumulative_net_pnl,
            financing,
            skipped_rows,
        });
        &self.snapshots[self.snapshots.len() - 1]
    }
}
