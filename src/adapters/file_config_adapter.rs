//! INI file configuration adapter.

use crate::domain::error::IdxtraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
    base_dir: Option<PathBuf>,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IdxtraderError> {
        let path = path.as_ref();
        let mut config = Ini::new_cs();
        config
            .load(path)
            .map_err(|reason| IdxtraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            base_dir: path.parent().map(Path::to_path_buf),
        })
    }

    pub fn from_string(content: &str) -> Result<Self, IdxtraderError> {
        let mut config = Ini::new_cs();
        config
            .read(content.to_string())
            .map_err(|reason| IdxtraderError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            base_dir: None,
        })
    }

    /// Resolve a configured path relative to the config file's directory.
    pub fn resolve_path(&self, value: &str) -> PathBuf {
        let path = PathBuf::from(value);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[backtest]
trade_log = strategy_2/strat_2_SP400_IR7D_trade_log.csv
rates = Overnight_Costs/Cleaned_SOFR.csv
output = /abs/results.csv
side = short
holding_period = 7
portfolio_cap = 5000000

[slippage]
alpha = 0.2
beta = 0.7

[selection]
exclude_indices = DJIA, DJTA, S&P 100
event_type = Index Review
"#;

    #[test]
    fn reads_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "side"), Some("short".to_string()));
        assert_eq!(adapter.get_int("backtest", "holding_period", 1), 7);
        assert_eq!(adapter.get_double("backtest", "portfolio_cap", 0.0), 5_000_000.0);
        assert_eq!(adapter.get_double("slippage", "beta", 0.0), 0.7);
        assert_eq!(
            adapter.get_string("selection", "event_type"),
            Some("Index Review".to_string())
        );
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("nosection", "key"), None);
        assert_eq!(adapter.get_int("backtest", "missing", 42), 42);
        assert_eq!(adapter.get_double("financing", "long_spread", 0.015), 0.015);
    }

    #[test]
    fn non_numeric_falls_back() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nportfolio_cap = lots\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "portfolio_cap", 99.0), 99.0);
    }

    #[test]
    fn empty_value_is_absent() {
        let adapter = FileConfigAdapter::from_string("[backtest]\noutput =\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "output"), None);
    }

    #[test]
    fn from_file_resolves_relative_paths() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();

        let base = file.path().parent().unwrap();
        let trade_log = adapter.get_string("backtest", "trade_log").unwrap();
        assert_eq!(
            adapter.resolve_path(&trade_log),
            base.join("strategy_2/strat_2_SP400_IR7D_trade_log.csv")
        );
        assert_eq!(adapter.resolve_path("/abs/results.csv"), PathBuf::from("/abs/results.csv"));
    }

    #[test]
    fn from_string_does_not_rebase() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.resolve_path("a/b.csv"), PathBuf::from("a/b.csv"));
    }

    #[test]
    fn from_file_missing_is_config_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, IdxtraderError::ConfigParse { .. }));
    }
}
