//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss)), clamped to [0, 100].
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0 (flat prices), then 50.
//!
//! Warmup: first n bars are not ready (need n price changes to compute initial average).

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

/// RSI reported when there were neither gains nor losses.
pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values: Vec<Option<IndicatorValue>> = vec![None; bars.len()];

    if period > 0 && bars.len() > period {
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for i in 1..bars.len() {
            let change = bars[i].close - bars[i - 1].close;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            if i <= period {
                avg_gain += gain / period as f64;
                avg_loss += loss / period as f64;
                if i < period {
                    continue;
                }
            } else {
                avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
                avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
            }

            values[i] = Some(IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss)));
        }
    }

    IndicatorSeries::from_values(IndicatorType::Rsi(period), bars.iter().map(|b| b.date), values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { NEUTRAL_RSI } else { 100.0 };
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}
