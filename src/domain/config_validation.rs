//! Configuration loading and validation.
//!
//! Reads `[backtest]`, `[indicators]` and `[data]` through a [`ConfigPort`],
//! applies defaults for absent keys and rejects malformed or out-of-range
//! values with the offending key named.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_RISK_FREE_RATE};
use crate::domain::error::BanktraderError;
use crate::domain::indicator_helpers::IndicatorConfig;
use crate::domain::strategy::StrategyKind;
use crate::domain::universe::{STOCKS, parse_codes};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = "data";

/// Everything a run needs, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub backtest: BacktestConfig,
    pub codes: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub data_dir: PathBuf,
}

pub fn load_run_settings(config: &dyn ConfigPort) -> Result<RunSettings, BanktraderError> {
    let backtest = load_backtest_config(config)?;
    let codes = load_codes(config)?;
    let (start_date, end_date) = load_dates(config)?;
    let data_dir = config
        .get_string("data", "dir")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    Ok(RunSettings {
        backtest,
        codes,
        start_date,
        end_date,
        data_dir: PathBuf::from(data_dir),
    })
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, BanktraderError> {
    let strategy = match config.get_string("backtest", "strategy") {
        Some(s) => s
            .parse::<StrategyKind>()
            .map_err(|reason| BanktraderError::invalid("backtest", "strategy", reason))?,
        None => StrategyKind::GoldenCross,
    };

    let backtest = BacktestConfig {
        initial_capital: parse_or(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?,
        strategy,
        stop_loss_pct: parse_value(config, "backtest", "stop_loss_pct")?,
        confirm_exits: parse_bool(config, "backtest", "confirm_exits")?.unwrap_or(false),
        risk_free_rate: parse_or(config, "backtest", "risk_free_rate", DEFAULT_RISK_FREE_RATE)?,
        indicators: load_indicator_config(config)?,
    };
    backtest.validate()?;
    Ok(backtest)
}

pub fn load_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, BanktraderError> {
    let defaults = IndicatorConfig::default();
    let indicators = IndicatorConfig {
        ma_short: parse_or(config, "indicators", "ma_short", defaults.ma_short)?,
        ma_long: parse_or(config, "indicators", "ma_long", defaults.ma_long)?,
        rsi_period: parse_or(config, "indicators", "rsi_period", defaults.rsi_period)?,
        bb_window: parse_or(config, "indicators", "bb_window", defaults.bb_window)?,
        bb_k: parse_or(config, "indicators", "bb_k", defaults.bb_k)?,
        volume_window: parse_or(config, "indicators", "volume_window", defaults.volume_window)?,
        volume_multiplier: parse_or(
            config,
            "indicators",
            "volume_multiplier",
            defaults.volume_multiplier,
        )?,
    };
    indicators.validate()?;
    Ok(indicators)
}

/// Configured codes, or the whole universe when `codes` is absent.
pub fn load_codes(config: &dyn ConfigPort) -> Result<Vec<String>, BanktraderError> {
    match config.get_string("backtest", "codes") {
        Some(list) => {
            parse_codes(&list)
                .map_err(|e| BanktraderError::invalid("backtest", "codes", e.to_string()))
        }
        None => Ok(STOCKS.iter().map(|(code, _)| code.to_string()).collect()),
    }
}

fn load_dates(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), BanktraderError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(BanktraderError::invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok((start_date, end_date))
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<Option<NaiveDate>, BanktraderError> {
    match config.get_string("backtest", field) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                BanktraderError::invalid(
                    "backtest",
                    field,
                    format!("invalid {} format, expected YYYY-MM-DD", field),
                )
            }),
    }
}

fn parse_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, BanktraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            BanktraderError::invalid(section, key, format!("cannot parse '{}'", raw.trim()))
        }),
    }
}

fn parse_or<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, BanktraderError> {
    Ok(parse_value(config, section, key)?.unwrap_or(default))
}

fn parse_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<bool>, BanktraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            _ => Err(BanktraderError::invalid(
                section,
                key,
                format!("expected a boolean, got '{}'", raw.trim()),
            )),
        },
    }
}
