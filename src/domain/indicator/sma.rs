//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are not ready.
//! `calculate_volume_sma` applies the same window to traded volume.

use crate::domain::indicator::rolling::map_windows;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = map_windows(&closes, period, |w| IndicatorValue::Simple(w.mean()));

    IndicatorSeries::from_values(IndicatorType::Sma(period), bars.iter().map(|b| b.date), values)
}

pub fn calculate_volume_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
    let values = map_windows(&volumes, period, |w| IndicatorValue::Simple(w.mean()));

    IndicatorSeries::from_values(
        IndicatorType::VolumeSma(period),
        bars.iter().map(|b| b.date),
        values,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
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
                volume: 1000 * (i as u64 + 1),
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert!(!series.values[0].is_ready());
        assert!(!series.values[1].is_ready());
        assert!(series.values[2].is_ready());
        assert!(series.values[4].is_ready());
    }

    #[test]
    fn sma_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert_eq!(series.simple_at(2), Some(20.0));
        assert_eq!(series.simple_at(3), Some(30.0));
        assert_eq!(series.simple_at(4), Some(40.0));
    }

    #[test]
    fn sma_dates_align_with_bars() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let series = calculate_sma(&bars, 2);
        for (point, bar) in series.values.iter().zip(&bars) {
            assert_eq!(point.date, bar.date);
        }
    }

    #[test]
    fn sma_window_longer_than_series_is_never_ready() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let series = calculate_sma(&bars, 4);
        assert_eq!(series.len(), 3);
        assert_eq!(series.ready_count(), 0);
    }

    #[test]
    fn sma_indicator_type() {
        let bars = make_bars(&[1.0]);
        assert_eq!(calculate_sma(&bars, 5).indicator_type, IndicatorType::Sma(5));
    }

    #[test]
    fn volume_sma_uses_volume() {
        let bars = make_bars(&[1.0, 1.0, 1.0, 1.0]);
        let series = calculate_volume_sma(&bars, 2);
        assert_eq!(series.simple_at(0), None);
        assert_eq!(series.simple_at(1), Some(1500.0));
        assert_eq!(series.simple_at(3), Some(3500.0));
        assert_eq!(series.indicator_type, IndicatorType::VolumeSma(2));
    }
}
