//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{read_snapshot_pnl, CsvAdapter};
use crate::adapters::csv_report_adapter::{metrics_csv, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::validate_backtest_config;
use crate::domain::error::IdxtraderError;
use crate::domain::execution::{ExecutionParams, DEFAULT_PORTFOLIO_CAP};
use crate::domain::financing::FinancingConfig;
use crate::domain::metrics::PortfolioMetrics;
use crate::domain::rate::{LONG_FINANCING_SPREAD, SHORT_FINANCING_SPREAD};
use crate::domain::selection::{parse_index_list, TradeLogFilter};
use crate::domain::slippage::SlippageParams;
use crate::domain::strategy::{StrategyConfig, DEFAULT_HOLDING_PERIOD};
use crate::domain::trade::{EntryPrice, Side};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "idxtrader", about = "Index-event trade log backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a trade log
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the snapshot output path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the configured side (long or short)
        #[arg(long)]
        side: Option<Side>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Compute portfolio metrics from a snapshot CSV
    Metrics {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            side,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, side)
            } else {
                run_backtest(&config, output.as_deref(), side)
            }
        }
        Command::Metrics { input, output } => run_metrics(&input, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: IdxtraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

/// Load and validate a config file, then build the run settings from it.
fn prepare(
    config_path: &Path,
    side_override: Option<Side>,
) -> Result<(FileConfigAdapter, BacktestConfig), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter).map_err(fail)?;

    let config = build_backtest_config(&adapter, side_override).map_err(fail)?;
    Ok((adapter, config))
}

fn run_backtest(
    config_path: &Path,
    output_override: Option<&Path>,
    side_override: Option<Side>,
) -> ExitCode {
    let (adapter, config) = match prepare(config_path, side_override) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let filter = build_filter(&adapter);

    let paths = match resolve_paths(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let output = output_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.output.clone());

    let data = CsvAdapter::new(paths.trade_log.clone(), paths.rates.clone());
    let result = match run_backtest_pipeline(&data, &config, &filter) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    let report = CsvReportAdapter;
    if let Err(e) = report.write_snapshots(&result.snapshots, &output) {
        return fail(e);
    }
    eprintln!("\nResults written to: {}", output.display());

    let metrics = PortfolioMetrics::compute(&result.snapshots);
    print_summary(&config, &result, &metrics);

    if let Some(metrics_path) = &paths.metrics_output {
        if let Err(e) = report.write_metrics(&metrics, metrics_path) {
            return fail(e);
        }
        eprintln!("Metrics written to: {}", metrics_path.display());
    }

    ExitCode::SUCCESS
}

/// Input and output locations named in `[backtest]`, resolved against the
/// config file's directory.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    pub trade_log: PathBuf,
    pub rates: PathBuf,
    pub output: PathBuf,
    pub metrics_output: Option<PathBuf>,
}

pub fn resolve_paths(adapter: &FileConfigAdapter) -> Result<RunPaths, IdxtraderError> {
    let required = |key: &str| {
        adapter
            .get_string("backtest", key)
            .map(|v| adapter.resolve_path(&v))
            .ok_or_else(|| IdxtraderError::ConfigMissing {
                section: "backtest".into(),
                key: key.into(),
            })
    };

    Ok(RunPaths {
        trade_log: required("trade_log")?,
        rates: required("rates")?,
        output: required("output")?,
        metrics_output: adapter
            .get_string("backtest", "metrics_output")
            .map(|v| adapter.resolve_path(&v)),
    })
}

fn parse_setting<T>(
    adapter: &dyn ConfigPort,
    key: &str,
    default: T,
) -> Result<T, IdxtraderError>
where
    T: std::str::FromStr<Err = String>,
{
    match adapter.get_string("backtest", key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|reason| IdxtraderError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason,
        }),
    }
}

/// Build run settings from `[backtest]`, `[slippage]` and `[financing]`.
///
/// `side_override` replaces the configured side before the side-dependent
/// defaults are chosen: a short run without explicit settings holds for
/// [`DEFAULT_HOLDING_PERIOD`] days and enters at the lookback close.
pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    side_override: Option<Side>,
) -> Result<BacktestConfig, IdxtraderError> {
    let side = match side_override {
        Some(side) => side,
        None => parse_setting(adapter, "side", Side::Long)?,
    };
    let (default_entry, default_hold) = match side {
        Side::Long => (EntryPrice::Open, 1),
        Side::Short => (EntryPrice::LookbackClose, DEFAULT_HOLDING_PERIOD),
    };
    let entry: EntryPrice = parse_setting(adapter, "entry_price", default_entry)?;

    let holding_period = adapter.get_int("backtest", "holding_period", default_hold as i64);
    let holding_period =
        u32::try_from(holding_period)
            .ok()
            .filter(|&h| h >= 1)
            .ok_or_else(|| IdxtraderError::ConfigInvalid {
                section: "backtest".into(),
                key: "holding_period".into(),
                reason: "holding_period must be a positive number of trading days".into(),
            })?;

    let slippage_defaults = SlippageParams::default();

    Ok(BacktestConfig {
        strategy: StrategyConfig {
            side,
            entry,
            holding_period,
        },
        execution: ExecutionParams {
            portfolio_cap: adapter.get_double("backtest", "portfolio_cap", DEFAULT_PORTFOLIO_CAP),
            slippage: SlippageParams {
                alpha: adapter.get_double("slippage", "alpha", slippage_defaults.alpha),
                beta: adapter.get_double("slippage", "beta", slippage_defaults.beta),
            },
        },
        financing: FinancingConfig {
            long_spread: adapter.get_double("financing", "long_spread", LONG_FINANCING_SPREAD),
            short_spread: adapter.get_double("financing", "short_spread", SHORT_FINANCING_SPREAD),
        },
    })
}

pub fn build_filter(adapter: &dyn ConfigPort) -> TradeLogFilter {
    let holding_day = adapter.get_int("selection", "holding_day", 0);
    TradeLogFilter {
        exclude_indices: adapter
            .get_string("selection", "exclude_indices")
            .map(|s| parse_index_list(&s))
            .unwrap_or_default(),
        event_type: adapter.get_string("selection", "event_type"),
        holding_day: u32::try_from(holding_day).ok().filter(|&d| d > 0),
    }
}

/// Load inputs through `data`, narrow them with `filter` and run the engine.
pub fn run_backtest_pipeline(
    data: &dyn DataPort,
    config: &BacktestConfig,
    filter: &TradeLogFilter,
) -> Result<BacktestResult, IdxtraderError> {
    let candidates = data.load_trade_log(config.strategy.entry)?;
    let rates = data.load_rates()?;
    log::info!(
        "loaded {} candidates and {} rate observations",
        candidates.len(),
        rates.len()
    );

    let candidates = filter.apply(candidates);
    if candidates.is_empty() {
        return Err(IdxtraderError::NoTrades);
    }

    Ok(backtest_engine::run_backtest(&candidates, &rates, config))
}

fn print_summary(config: &BacktestConfig, result: &BacktestResult, metrics: &PortfolioMetrics) {
    let fmt = |v: Option<f64>| match v {
        Some(x) => format!("{x:.4}"),
        None => "n/a".to_string(),
    };

    eprintln!(
        "\n=== {} / {} entry / {}-day hold ===",
        config.strategy.side, config.strategy.entry, config.strategy.holding_period
    );
    eprintln!("Trading days:       {}", metrics.trading_days);
    eprintln!("Cumulative PnL:     {:.2}", result.final_cumulative_pnl());
    eprintln!("Information Ratio:  {}", fmt(metrics.information_ratio));
    eprintln!("Sharpe Ratio:       {}", fmt(metrics.sharpe_ratio));
    eprintln!("Max Drawdown:       {}", fmt(metrics.max_drawdown));
    eprintln!("Annualized Return:  {}", fmt(metrics.annualized_return));
    eprintln!("Margin:             {}", fmt(metrics.margin));
    eprintln!("Turnover:           {}", fmt(metrics.turnover));

    if result.skipped_rows > 0 {
        eprintln!("warning: {} rows skipped (unpriceable)", result.skipped_rows);
    }
    if result.days_without_rate > 0 {
        eprintln!(
            "warning: {} days charged no financing (no rate available)",
            result.days_without_rate
        );
    }
}

pub fn run_dry_run(config_path: &Path, side_override: Option<Side>) -> ExitCode {
    let (adapter, config) = match prepare(config_path, side_override) {
        Ok(p) => p,
        Err(code) => return code,
    };
    eprintln!("Config validated successfully");

    let paths = match resolve_paths(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    eprintln!("\nStrategy:");
    eprintln!("  side:             {}", config.strategy.side);
    eprintln!("  entry price:      {}", config.strategy.entry);
    eprintln!("  holding period:   {}", config.strategy.holding_period);
    eprintln!("  financing window: {}", config.strategy.financing_window());
    eprintln!("  portfolio cap:    {}", config.execution.portfolio_cap);
    eprintln!(
        "  slippage:         alpha={} beta={}",
        config.execution.slippage.alpha, config.execution.slippage.beta
    );

    let filter = build_filter(&adapter);
    if !filter.is_empty() {
        eprintln!("\nSelection:");
        if !filter.exclude_indices.is_empty() {
            eprintln!("  exclude indices:  {}", filter.exclude_indices.join(", "));
        }
        if let Some(event_type) = &filter.event_type {
            eprintln!("  event type:       {event_type}");
        }
        if let Some(day) = filter.holding_day {
            eprintln!("  holding day:      {day}");
        }
    }

    eprintln!("\nFiles:");
    for (label, path) in [
        ("trade log", &paths.trade_log),
        ("rates", &paths.rates),
    ] {
        let status = if path.exists() { "" } else { " (not found)" };
        eprintln!("  {label:<17} {}{status}", path.display());
    }
    eprintln!("  {:<17} {}", "output", paths.output.display());

    ExitCode::SUCCESS
}

fn run_metrics(input: &Path, output: Option<&Path>) -> ExitCode {
    eprintln!("Loading snapshots from {}", input.display());
    let rows = match read_snapshot_pnl(input) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    let metrics = PortfolioMetrics::from_rows(&rows);

    match metrics_csv(&metrics) {
        Ok(text) => print!("{text}"),
        Err(e) => return fail(e),
    }

    if let Some(path) = output {
        if let Err(e) = CsvReportAdapter.write_metrics(&metrics, path) {
            return fail(e);
        }
        eprintln!("Metrics written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_backtest_config(&adapter).and_then(|_| build_backtest_config(&adapter, None)) {
        Ok(config) => {
            eprintln!(
                "Config valid: {} side, {} entry, {}-day hold",
                config.strategy.side, config.strategy.entry, config.strategy.holding_period
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
