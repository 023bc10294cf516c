//! CSV report adapter: snapshot series and metrics row.
//!
//! Column names are consumed by downstream tooling and must stay stable.

use crate::domain::error::IdxtraderError;
use crate::domain::metrics::PortfolioMetrics;
use crate::domain::portfolio::DailySnapshot;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub const SNAPSHOT_COLUMNS: [&str; 8] = [
    "Date",
    "Total_Position_Size",
    "Total_Sale_Proceeds",
    "RGL",
    "Transaction_Costs",
    "Slippage_Cost",
    "Overnight_Cost",
    "Cumulative_Net_PnL",
];

pub const METRICS_COLUMNS: [&str; 6] = [
    "Information_Ratio",
    "Sharpe_Ratio",
    "Max_Drawdown",
    "Annualized_Return",
    "Margin",
    "Turnover",
];

pub struct CsvReportAdapter;

/// Render the snapshot series as CSV text.
pub fn snapshots_csv(snapshots: &[DailySnapshot]) -> Result<String, IdxtraderError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(SNAPSHOT_COLUMNS)?;

    for s in snapshots {
        wtr.write_record([
            s.date.format("%Y-%m-%d").to_string(),
            s.total_position_size.to_string(),
            s.total_sale_proceeds.to_string(),
            s.rgl.to_string(),
            s.transaction_costs.to_string(),
            s.slippage_cost.to_string(),
            s.overnight_cost.to_string(),
            s.cumulative_net_pnl.to_string(),
        ])?;
    }

    finish(wtr)
}

/// Render the metrics as a one-row CSV. Undefined values are written as `NaN`.
pub fn metrics_csv(metrics: &PortfolioMetrics) -> Result<String, IdxtraderError> {
    let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "NaN".to_string());

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(METRICS_COLUMNS)?;
    wtr.write_record([
        cell(metrics.information_ratio),
        cell(metrics.sharpe_ratio),
        cell(metrics.max_drawdown),
        cell(metrics.annualized_return),
        cell(metrics.margin),
        cell(metrics.turnover),
    ])?;

    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, IdxtraderError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| IdxtraderError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| IdxtraderError::Io(std::io::Error::other(e)))
}

fn write_file(output_path: &Path, content: &str) -> Result<(), IdxtraderError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output_path, content)?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write_snapshots(
        &self,
        snapshots: &[DailySnapshot],
        output_path: &Path,
    ) -> Result<(), IdxtraderError> {
        write_file(output_path, &snapshots_csv(snapshots)?)
    }

    fn write_metrics(
        &self,
        metrics: &PortfolioMetrics,
        output_path: &Path,
    ) -> Result<(), IdxtraderError> {
        write_file(output_path, &metrics_csv(metrics)?)
    }
}
