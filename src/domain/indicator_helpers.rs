//! Indicator dispatch: computes a requested set of indicators for one series.

use std::collections::HashMap;

use crate::domain::error::BanktraderError;
use crate::domain::indicator::bollinger::{self, calculate_bollinger};
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::rsi::{self, calculate_rsi};
use crate::domain::indicator::sma::{calculate_sma, calculate_volume_sma};
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, calculate_ema};
use crate::domain::ohlcv::Bar;

pub type IndicatorMap = HashMap<IndicatorType, IndicatorSeries>;

pub const DEFAULT_MA_SHORT: usize = 5;
pub const DEFAULT_MA_LONG: usize = 20;
pub const DEFAULT_VOLUME_WINDOW: usize = 20;
pub const DEFAULT_VOLUME_MULTIPLIER: f64 = 1.2;

const SECTION: &str = "indicators";

/// Window parameters for the indicators and the signal rules built on them.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub ma_short: usize,
    pub ma_long: usize,
    pub rsi_period: usize,
    pub bb_window: usize,
    pub bb_k: f64,
    pub volume_window: usize,
    pub volume_multiplier: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            ma_short: DEFAULT_MA_SHORT,
            ma_long: DEFAULT_MA_LONG,
            rsi_period: rsi::DEFAULT_PERIOD,
            bb_window: bollinger::DEFAULT_PERIOD,
            bb_k: bollinger::DEFAULT_MULTIPLIER,
            volume_window: DEFAULT_VOLUME_WINDOW,
            volume_multiplier: DEFAULT_VOLUME_MULTIPLIER,
        }
    }
}

impl IndicatorConfig {
    pub fn short_ma(&self) -> IndicatorType {
        IndicatorType::Sma(self.ma_short)
    }

    pub fn long_ma(&self) -> IndicatorType {
        IndicatorType::Sma(self.ma_long)
    }

    pub fn rsi(&self) -> IndicatorType {
        IndicatorType::Rsi(self.rsi_period)
    }

    pub fn bands(&self) -> IndicatorType {
        IndicatorType::bollinger(self.bb_window, self.bb_k)
    }

    pub fn volume_average(&self) -> IndicatorType {
        IndicatorType::VolumeSma(self.volume_window)
    }

    /// Every indicator the signal rules read.
    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![
            self.short_ma(),
            self.long_ma(),
            self.rsi(),
            self.bands(),
            self.volume_average(),
        ]
    }

    pub fn validate(&self) -> Result<(), BanktraderError> {
        if self.ma_short == 0 {
            return Err(BanktraderError::invalid(SECTION, "ma_short", "ma_short must be positive"));
        }
        if self.ma_long <= self.ma_short {
            return Err(BanktraderError::invalid(
                SECTION,
                "ma_long",
                format!("ma_long ({}) must exceed ma_short ({})", self.ma_long, self.ma_short),
            ));
        }
        if self.rsi_period == 0 {
            return Err(BanktraderError::invalid(
                SECTION,
                "rsi_period",
                "rsi_period must be positive",
            ));
        }
        if self.bb_window == 0 {
            return Err(BanktraderError::invalid(
                SECTION,
                "bb_window",
                "bb_window must be positive",
            ));
        }
        if !(self.bb_k > 0.0 && self.bb_k.is_finite()) {
            return Err(BanktraderError::invalid(SECTION, "bb_k", "bb_k must be positive"));
        }
        if self.volume_window == 0 {
            return Err(BanktraderError::invalid(
                SECTION,
                "volume_window",
                "volume_window must be positive",
            ));
        }
        if !(self.volume_multiplier >= 1.0 && self.volume_multiplier.is_finite()) {
            return Err(BanktraderError::invalid(
                SECTION,
                "volume_multiplier",
                "volume_multiplier must be at least 1.0",
            ));
        }
        Ok(())
    }
}

pub fn compute_indicator(bars: &[Bar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Ema(period) => calculate_ema(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::Stddev(period) => calculate_stddev(bars, period),
        IndicatorType::VolumeSma(period) => calculate_volume_sma(bars, period),
        IndicatorType::Bollinger {
            period,
            multiplier_bits,
        } => calculate_bollinger(bars, period, f64::from_bits(multiplier_bits)),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
    }
}

/// Compute every requested indicator; duplicates are computed once.
pub fn compute_indicators(bars: &[Bar], types: &[IndicatorType]) -> IndicatorMap {
    let mut map = IndicatorMap::with_capacity(types.len());
    for &indicator_type in types {
        map.entry(indicator_type)
            .or_insert_with(|| compute_indicator(bars, indicator_type));
    }
    map
}
