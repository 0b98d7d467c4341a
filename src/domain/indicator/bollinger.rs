//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//! The middle band comes from the same accumulator as `calculate_sma`, so the
//! two are bit-identical for equal windows.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are not ready.

use crate::domain::indicator::rolling::map_windows;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

pub fn calculate_bollinger(bars: &[Bar], period: usize, multiplier: f64) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = map_windows(&closes, period, |w| {
        let middle = w.mean();
        let band = multiplier * w.population_stddev();
        IndicatorValue::Bollinger {
            upper: middle + band,
            middle,
            lower: middle - band,
        }
    });

    IndicatorSeries::from_values(
        IndicatorType::bollinger(period, multiplier),
        bars.iter().map(|b| b.date),
        values,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::sma::calculate_sma;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn bands_at(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.value_at(i) {
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => (upper, middle, lower),
            other => panic!("Expected Bollinger value, got {:?}", other),
        }
    }

    #[test]
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);

        assert!(!series.values[0].is_ready());
        assert!(!series.values[1].is_ready());
        assert!(series.values[2].is_ready());
        assert!(series.values[4].is_ready());
    }

    #[test]
    fn bollinger_constant_values() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0, 100.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);

        let (upper, middle, lower) = bands_at(&series, 2);
        assert_eq!(middle, 100.0);
        assert_eq!(upper, 100.0);
        assert_eq!(lower, 100.0);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);

        let (upper, middle, lower) = bands_at(&series, 2);
        let expected_middle: f64 = 20.0;
        let stddev = (200.0f64 / 3.0).sqrt();

        assert!((middle - expected_middle).abs() < 1e-10);
        assert!((upper - (expected_middle + 2.0 * stddev)).abs() < 1e-10);
        assert!((lower - (expected_middle - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let narrow = calculate_bollinger(&bars, 3, 1.0);
        let wide = calculate_bollinger(&bars, 3, 3.0);

        let (nu, _, nl) = bands_at(&narrow, 2);
        let (wu, _, wl) = bands_at(&wide, 2);
        assert!(((wu - wl) - 3.0 * (nu - nl)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let bars = make_bars(&[10.0, 12.0, 17.0, 11.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);

        let (upper, middle, lower) = bands_at(&series, 3);
        assert!(((upper - middle) - (middle - lower)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_middle_matches_sma_exactly() {
        let bars = make_bars(&[10.3, 11.7, 9.2, 14.1, 13.3, 12.9, 15.5, 8.8]);
        let bands = calculate_bollinger(&bars, 4, 2.0);
        let sma = calculate_sma(&bars, 4);

        for i in 0..bars.len() {
            let middle = bands.value_at(i).map(|_| bands_at(&bands, i).1);
            assert_eq!(middle, sma.simple_at(i), "index {}", i);
        }
    }

    #[test]
    fn bollinger_indicator_type() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 20, 2.0);

        assert_eq!(
            series.indicator_type,
            IndicatorType::Bollinger {
                period: 20,
                multiplier_bits: 2.0f64.to_bits()
            }
        );
        assert_eq!(series.ready_count(), 0);
    }
}
