//! The fixed universe of Taiwan financial-holding stocks.
//!
//! Normalises user-supplied symbols, parses code lists from configuration and
//! loads each code's series, skipping codes the data source cannot serve.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::error::BanktraderError;
use crate::domain::ohlcv::SeriesStore;
use crate::ports::data_port::DataPort;

/// Bars below which a backtest is unlikely to see a long-MA crossover.
pub const MIN_DATA_POINTS: usize = 50;

pub const SYMBOL_SUFFIX: &str = ".TW";

/// Code and name of every supported stock.
pub const STOCKS: [(&str, &str); 13] = [
    ("2880.TW", "華南金"),
    ("2881.TW", "富邦金"),
    ("2882.TW", "國泰金"),
    ("2883.TW", "開發金"),
    ("2884.TW", "玉山金"),
    ("2885.TW", "元大金"),
    ("2886.TW", "兆豐金"),
    ("2887.TW", "台新金"),
    ("2888.TW", "新光金"),
    ("2889.TW", "國票金"),
    ("2890.TW", "永豐金"),
    ("2891.TW", "中信金"),
    ("2892.TW", "第一金"),
];

pub fn stock_name(code: &str) -> Option<&'static str> {
    STOCKS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// `2881`, `2881.tw` and ` 2881.TW ` all become `2881.TW`.
pub fn normalize_symbol(input: &str) -> Result<String, BanktraderError> {
    let trimmed = input.trim();
    let upper = trimmed.to_uppercase();
    let digits = upper.strip_suffix(SYMBOL_SUFFIX).unwrap_or(&upper);

    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(format!("{}{}", digits, SYMBOL_SUFFIX))
    } else {
        Err(BanktraderError::InvalidSymbol {
            symbol: trimmed.to_string(),
        })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("invalid code: {0}")]
    InvalidCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = normalize_symbol(trimmed)
            .map_err(|_| UniverseError::InvalidCode(trimmed.to_string()))?;
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug)]
pub struct UniverseValidationResult {
    pub series: Vec<SeriesStore>,
    pub skipped: Vec<SkippedCode>,
}

#[derive(Debug, Clone)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    Failed(String),
}

/// Load every code's series. Codes with no data (or whose source fails) are
/// skipped; short histories are kept with a warning.
pub fn validate_universe(
    data_port: &dyn DataPort,
    codes: &[String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<UniverseValidationResult, BanktraderError> {
    let mut series = Vec::new();
    let mut skipped = Vec::new();

    for code in codes {
        let store = match data_port.fetch_series(code, start_date, end_date) {
            Ok(store) => store,
            Err(e) => {
                warn!(code = %code, error = %e, "skipping code");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::Failed(e.to_string()),
                });
                continue;
            }
        };

        if store.is_empty() {
            warn!(code = %code, "skipping code: no data in range");
            skipped.push(SkippedCode {
                code: code.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        }

        if store.len() < MIN_DATA_POINTS {
            warn!(
                code = %code,
                bars = store.len(),
                minimum = MIN_DATA_POINTS,
                "short history, signals may never fire"
            );
        }
        series.push(store);
    }

    if series.is_empty() {
        return Err(BanktraderError::NoData {
            code: codes.join(","),
        });
    }

    info!(loaded = series.len(), skipped = skipped.len(), "universe validated");
    Ok(UniverseValidationResult { series, skipped })
}
