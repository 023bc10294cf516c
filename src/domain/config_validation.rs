//! Configuration validation.
//!
//! Validates every backtest config field before any input is loaded.

use crate::domain::error::IdxtraderError;
use crate::domain::trade::{EntryPrice, Side};
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    validate_paths(config)?;
    validate_side(config)?;
    validate_entry_price(config)?;
    validate_holding_period(config)?;
    validate_portfolio_cap(config)?;
    validate_slippage(config)?;
    validate_financing(config)?;
    validate_selection(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> IdxtraderError {
    IdxtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_paths(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    for key in ["trade_log", "rates", "output"] {
        if config.get_string("backtest", key).is_none() {
            return Err(IdxtraderError::ConfigMissing {
                section: "backtest".to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_side(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    match config.get_string("backtest", "side") {
        None => Ok(()),
        Some(s) => s
            .parse::<Side>()
            .map(|_| ())
            .map_err(|reason| invalid("backtest", "side", reason)),
    }
}

fn validate_entry_price(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    match config.get_string("backtest", "entry_price") {
        None => Ok(()),
        Some(s) => s
            .parse::<EntryPrice>()
            .map(|_| ())
            .map_err(|reason| invalid("backtest", "entry_price", reason)),
    }
}

/// Parse `[section] key` as a number, `None` when absent.
fn number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, IdxtraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(section, key, format!("'{raw}' is not a number"))),
    }
}

fn positive_whole(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), IdxtraderError> {
    match config.get_string(section, key) {
        None => Ok(()),
        Some(raw) => match raw.parse::<u32>() {
            Ok(v) if v >= 1 => Ok(()),
            _ => Err(invalid(
                section,
                key,
                format!("{key} must be a positive whole number, got '{raw}'"),
            )),
        },
    }
}

fn non_negative(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), IdxtraderError> {
    match number(config, section, key)? {
        Some(v) if v < 0.0 => Err(invalid(section, key, format!("{key} must be non-negative"))),
        _ => Ok(()),
    }
}

fn validate_holding_period(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    positive_whole(config, "backtest", "holding_period")
}

fn validate_portfolio_cap(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    match number(config, "backtest", "portfolio_cap")? {
        Some(v) if v <= 0.0 => Err(invalid(
            "backtest",
            "portfolio_cap",
            "portfolio_cap must be positive",
        )),
        _ => Ok(()),
    }
}

fn validate_slippage(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    non_negative(config, "slippage", "alpha")?;
    non_negative(config, "slippage", "beta")
}

fn validate_financing(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    non_negative(config, "financing", "long_spread")?;
    non_negative(config, "financing", "short_spread")
}

fn validate_selection(config: &dyn ConfigPort) -> Result<(), IdxtraderError> {
    positive_whole(config, "selection", "holding_day")
}
