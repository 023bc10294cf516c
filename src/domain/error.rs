//! Domain error types.

/// Top-level error type for idxtrader.
#[derive(Debug, thiserror::Error)]
pub enum IdxtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("{file}: missing required column {column}")]
    MissingColumn { file: String, column: String },

    #[error("{file}:{line}: {reason}")]
    InvalidRow {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("malformed rate series: {reason}")]
    MalformedRateSeries { reason: String },

    #[error("trade log contains no candidates after selection")]
    NoTrades,

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&IdxtraderError> for std::process::ExitCode {
    fn from(err: &IdxtraderError) -> Self {
        let code: u8 = match err {
            IdxtraderError::Io(_) => 1,
            IdxtraderError::ConfigParse { .. }
            | IdxtraderError::ConfigMissing { .. }
            | IdxtraderError::ConfigInvalid { .. } => 2,
            IdxtraderError::MissingColumn { .. }
            | IdxtraderError::InvalidRow { .. }
            | IdxtraderError::MalformedRateSeries { .. }
            | IdxtraderError::Csv(_) => 3,
            IdxtraderError::NoTrades => 5,
        };
        std::process::ExitCode::from(code)
    }
}
