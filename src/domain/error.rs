//! Domain error types.

/// Top-level error type for banktrader.
#[derive(Debug, thiserror::Error)]
pub enum BanktraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid series for {code}: {reason}")]
    InvalidSeries { code: String, reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("invalid symbol '{symbol}' (expected NNNN or NNNN.TW)")]
    InvalidSymbol { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BanktraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BanktraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// The configuration key this error is about, if any.
    pub fn config_key(&self) -> Option<&str> {
        match self {
            BanktraderError::ConfigInvalid { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl From<&BanktraderError> for std::process::ExitCode {
    fn from(err: &BanktraderError) -> Self {
        let code: u8 = match err {
            BanktraderError::Io(_) => 1,
            BanktraderError::ConfigParse { .. } | BanktraderError::ConfigInvalid { .. } => 2,
            BanktraderError::DataSource { .. } | BanktraderError::NoData { .. } => 3,
            BanktraderError::InvalidSeries { .. } => 4,
            BanktraderError::InvalidSymbol { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
