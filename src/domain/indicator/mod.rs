//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values, aligned 1:1 with the bars
//!
//! A point whose `value` is `None` is still inside the indicator's warm-up
//! period. Consumers must treat it as "not ready", never as zero.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use ema::calculate_ema;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

impl IndicatorPoint {
    pub fn is_ready(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
    Macd { line: f64, signal: f64, histogram: f64 },
}

impl IndicatorValue {
    pub fn as_simple(&self) -> Option<f64> {
        match self {
            IndicatorValue::Simple(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    VolumeSma(usize),
    /// `multiplier_bits` is `f64::to_bits` of the band multiplier, so the
    /// key carries the exact value.
    Bollinger {
        period: usize,
        multiplier_bits: u64,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl IndicatorType {
    pub fn bollinger(period: usize, multiplier: f64) -> Self {
        IndicatorType::Bollinger {
            period,
            multiplier_bits: multiplier.to_bits(),
        }
    }

    /// Band multiplier for `Bollinger`, `None` for every other type.
    pub fn band_multiplier(&self) -> Option<f64> {
        match self {
            IndicatorType::Bollinger {
                multiplier_bits, ..
            } => Some(f64::from_bits(*multiplier_bits)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn from_values(
        indicator_type: IndicatorType,
        dates: impl Iterator<Item = NaiveDate>,
        values: Vec<Option<IndicatorValue>>,
    ) -> Self {
        let values = dates
            .zip(values)
            .map(|(date, value)| IndicatorPoint { date, value })
            .collect();
        IndicatorSeries {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<IndicatorValue> {
        self.values.get(index).and_then(|p| p.value)
    }

    /// Scalar value at `index`; `None` while warming up or for multi-field indicators.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        self.value_at(index).and_then(|v| v.as_simple())
    }

    pub fn ready_count(&self) -> usize {
        self.values.iter().filter(|p| p.is_ready()).count()
    }

    pub fn latest(&self) -> Option<&IndicatorPoint> {
        self.values.last()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::Bollinger {
                period,
                multiplier_bits,
            } => write!(f, "BOLLINGER({},{})", period, f64::from_bits(*multiplier_bits)),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}
