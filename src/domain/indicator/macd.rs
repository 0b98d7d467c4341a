//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 bars

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    let dates = bars.iter().map(|b| b.date);
    let mut values = vec![None; bars.len()];

    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries::from_values(indicator_type, dates, values);
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let line_start = fast.max(slow) - 1;
    if line_start < closes.len() {
        let defined: Vec<f64> = line[line_start..].iter().flatten().copied().collect();
        let signal = ema_values(&defined, signal_period);

        for (offset, sig) in signal.into_iter().enumerate() {
            if let Some(signal) = sig {
                let i = line_start + offset;
                let line = defined[offset];
                values[i] = Some(IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                });
            }
        }
    }

    IndicatorSeries::from_values(indicator_type, dates, values)
}

pub fn calculate_macd_default(bars: &[Bar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(count: usize) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + i as f64 + (i % 4) as f64 * 0.5;
                Bar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1000,
                }
            })
            .collect()
    }

    fn macd_at(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.value_at(i) {
            Some(IndicatorValue::Macd {
                line,
                signal,
                histogram,
            }) => (line, signal, histogram),
            other => panic!("Expected MACD value, got {:?}", other),
        }
    }

    #[test]
    fn macd_warmup_default() {
        let bars = make_bars(40);
        let series = calculate_macd_default(&bars);

        let warmup = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;
        for i in 0..warmup {
            assert!(!series.values[i].is_ready(), "Index {} should not be ready", i);
        }
        assert!(series.values[warmup].is_ready());
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let bars = make_bars(40);
        let series = calculate_macd_default(&bars);

        for i in 0..bars.len() {
            if series.values[i].is_ready() {
                let (line, signal, histogram) = macd_at(&series, i);
                assert!((histogram - (line - signal)).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let bars = make_bars(12);
        let series = calculate_macd(&bars, 3, 5, 2);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_values(&closes, 3);
        let slow = ema_values(&closes, 5);

        for i in 0..bars.len() {
            if series.values[i].is_ready() {
                let (line, _, _) = macd_at(&series, i);
                let expected = fast[i].unwrap() - slow[i].unwrap();
                assert!((line - expected).abs() < f64::EPSILON, "index {}", i);
            }
        }
    }

    #[test]
    fn macd_custom_parameters() {
        let bars = make_bars(20);
        let series = calculate_macd(&bars, 5, 10, 3);

        let warmup = 10 - 1 + 3 - 1;
        assert!(!series.values[warmup - 1].is_ready());
        assert!(series.values[warmup].is_ready());
    }

    #[test]
    fn macd_short_series_is_never_ready() {
        let bars = make_bars(20);
        let series = calculate_macd_default(&bars);
        assert_eq!(series.len(), 20);
        assert_eq!(series.ready_count(), 0);
    }

    #[test]
    fn macd_zero_period_keeps_alignment() {
        let bars = make_bars(3);
        for series in [
            calculate_macd(&bars, 0, 26, 9),
            calculate_macd(&bars, 12, 0, 9),
            calculate_macd(&bars, 12, 26, 0),
        ] {
            assert_eq!(series.len(), 3);
            assert_eq!(series.ready_count(), 0);
        }
    }

    #[test]
    fn macd_indicator_type() {
        let bars = make_bars(3);
        let series = calculate_macd(&bars, 5, 10, 3);

        assert_eq!(
            series.indicator_type,
            IndicatorType::Macd {
                fast: 5,
                slow: 10,
                signal: 3
            }
        );
    }
}
