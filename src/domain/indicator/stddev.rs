//! Standard Deviation indicator.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are not ready.

use crate::domain::indicator::rolling::map_windows;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub fn calculate_stddev(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = map_windows(&closes, period, |w| {
        IndicatorValue::Simple(w.population_stddev())
    });

    IndicatorSeries::from_values(
        IndicatorType::Stddev(period),
        bars.iter().map(|b| b.date),
        values,
    )
}
