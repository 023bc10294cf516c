//! Result output port trait.

use crate::domain::error::IdxtraderError;
use crate::domain::metrics::PortfolioMetrics;
use crate::domain::portfolio::DailySnapshot;
use std::path::Path;

/// Port for writing backtest output.
pub trait ReportPort {
    fn write_snapshots(
        &self,
        snapshots: &[DailySnapshot],
        output_path: &Path,
    ) -> Result<(), IdxtraderError>;

    fn write_metrics(
        &self,
        metrics: &PortfolioMetrics,
        output_path: &Path,
    ) -> Result<(), IdxtraderError>;
}
