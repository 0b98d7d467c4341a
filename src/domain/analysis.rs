//! Latest-bar market snapshot: trend, volume regime, support/resistance and
//! volatility.

use std::fmt;

use chrono::NaiveDate;

use super::indicator::rsi::calculate_rsi;
use super::indicator::sma::calculate_sma;
use super::indicator_helpers::IndicatorConfig;
use super::metrics::{TRADING_DAYS_PER_YEAR, sample_stddev};
use super::ohlcv::{Bar, SeriesStore};

pub const DEFAULT_LEVEL_WINDOW: usize = 20;
pub const DEFAULT_VOLATILITY_PERIOD: usize = 20;
const VOLUME_LOOKBACK: usize = 20;
const PIVOT_SPAN: usize = 5;
const PIVOTS_AVERAGED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    StrongUptrend,
    Uptrend,
    StrongDowntrend,
    Downtrend,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::StrongUptrend => "strong uptrend",
            Trend::Uptrend => "uptrend",
            Trend::StrongDowntrend => "strong downtrend",
            Trend::Downtrend => "downtrend",
            Trend::Sideways => "sideways",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTrend {
    Expanding,
    Contracting,
    Normal,
}

impl fmt::Display for VolumeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolumeTrend::Expanding => "expanding",
            VolumeTrend::Contracting => "contracting",
            VolumeTrend::Normal => "normal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub support: f64,
    pub resistance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub rsi: Option<f64>,
    pub trend: Trend,
    pub volume_trend: VolumeTrend,
    pub levels: Levels,
    pub volatility: Option<f64>,
}

impl MarketSnapshot {
    /// Snapshot of the last bar; `None` for an empty series.
    pub fn compute(series: &SeriesStore, config: &IndicatorConfig) -> Option<Self> {
        let bars = series.bars();
        let last = bars.last()?;
        let i = bars.len() - 1;

        let short_ma = calculate_sma(bars, config.ma_short).simple_at(i);
        let long_ma = calculate_sma(bars, config.ma_long).simple_at(i);
        let rsi = calculate_rsi(bars, config.rsi_period).simple_at(i);

        Some(MarketSnapshot {
            date: last.date,
            close: last.close,
            short_ma,
            long_ma,
            rsi,
            trend: classify_trend(last.close, short_ma, long_ma),
            volume_trend: classify_volume(bars),
            levels: support_resistance(bars, DEFAULT_LEVEL_WINDOW)?,
            volatility: annualized_volatility(bars, DEFAULT_VOLATILITY_PERIOD),
        })
    }
}

pub fn classify_trend(close: f64, short_ma: Option<f64>, long_ma: Option<f64>) -> Trend {
    let (Some(short), Some(long)) = (short_ma, long_ma) else {
        return Trend::Sideways;
    };
    if close > long && long > short {
        Trend::StrongUptrend
    } else if close > long {
        Trend::Uptrend
    } else if close < long && long < short {
        Trend::StrongDowntrend
    } else if close < long {
        Trend::Downtrend
    } else {
        Trend::Sideways
    }
}

/// Latest volume against the mean of the last 20 bars (latest included).
pub fn classify_volume(bars: &[Bar]) -> VolumeTrend {
    let Some(last) = bars.last() else {
        return VolumeTrend::Normal;
    };
    let tail = &bars[bars.len().saturating_sub(VOLUME_LOOKBACK)..];
    let average = tail.iter().map(|b| b.volume as f64).sum::<f64>() / tail.len() as f64;
    let volume = last.volume as f64;

    if volume > average * 1.5 {
        VolumeTrend::Expanding
    } else if volume < average * 0.5 {
        VolumeTrend::Contracting
    } else {
        VolumeTrend::Normal
    }
}

/// Support and resistance over the last `window` bars.
///
/// A pivot high is a bar whose high equals the maximum of the 5-bar window
/// centred on it (pivot lows likewise). Resistance averages the three highest
/// pivot highs and support the three lowest pivot lows; without pivots the
/// window extremes are used.
pub fn support_resistance(bars: &[Bar], window: usize) -> Option<Levels> {
    let tail = &bars[bars.len().saturating_sub(window)..];
    if tail.is_empty() {
        return None;
    }

    let highs: Vec<f64> = tail.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = tail.iter().map(|b| b.low).collect();

    let mut pivot_highs = centred_pivots(&highs, f64::max);
    let mut pivot_lows = centred_pivots(&lows, f64::min);

    let resistance = if pivot_highs.is_empty() {
        highs.iter().copied().fold(f64::MIN, f64::max)
    } else {
        pivot_highs.sort_by(|a, b| b.total_cmp(a));
        mean(&pivot_highs[..pivot_highs.len().min(PIVOTS_AVERAGED)])
    };
    let support = if pivot_lows.is_empty() {
        lows.iter().copied().fold(f64::MAX, f64::min)
    } else {
        pivot_lows.sort_by(f64::total_cmp);
        mean(&pivot_lows[..pivot_lows.len().min(PIVOTS_AVERAGED)])
    };

    Some(Levels {
        support,
        resistance,
    })
}

fn centred_pivots(values: &[f64], pick: fn(f64, f64) -> f64) -> Vec<f64> {
    let half = PIVOT_SPAN / 2;
    if values.len() < PIVOT_SPAN {
        return Vec::new();
    }
    (half..values.len() - half)
        .filter_map(|i| {
            let extreme = values[i - half..=i + half].iter().copied().reduce(pick)?;
            (values[i] == extreme).then_some(values[i])
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample stddev of the last `period` daily close returns, annualized.
pub fn annualized_volatility(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }
    let returns: Vec<f64> = bars[bars.len() - period - 1..]
        .windows(2)
        .filter(|w| w[0].close > 0.0)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect();
    sample_stddev(&returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
}
