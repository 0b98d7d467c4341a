//! Signal detection: turns aligned indicator series into dated events.
//!
//! # Rules
//!
//! - `GoldenCross` on `t`: short(t-1) <= long(t-1) and short(t) > long(t).
//!   `DeathCross` is the mirror image. Both days must be ready.
//! - A flat touch (short == long) that returns to the side it came from does
//!   not fire. The detector tracks the last strict side, so golden and death
//!   crosses always alternate.
//! - `VolumeConfirmedBuy`/`Sell`: a cross whose volume exceeds `multiplier` ×
//!   the average volume of the `w` bars before it (the cross day excluded).
//! - `UpperBandBreach`/`LowerBandBreach`: the close moves outside a Bollinger
//!   band it was inside of the day before.
//!
//! Stop-loss signals depend on the entry price and are emitted by the
//! simulator, not here.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::domain::indicator::{IndicatorSeries, IndicatorValue};
use crate::domain::indicator_helpers::{IndicatorConfig, IndicatorMap};
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalKind {
    GoldenCross,
    DeathCross,
    VolumeConfirmedBuy,
    VolumeConfirmedSell,
    StopLoss,
    UpperBandBreach,
    LowerBandBreach,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::GoldenCross => "GOLDEN_CROSS",
            SignalKind::DeathCross => "DEATH_CROSS",
            SignalKind::VolumeConfirmedBuy => "VOLUME_CONFIRMED_BUY",
            SignalKind::VolumeConfirmedSell => "VOLUME_CONFIRMED_SELL",
            SignalKind::StopLoss => "STOP_LOSS",
            SignalKind::UpperBandBreach => "UPPER_BAND_BREACH",
            SignalKind::LowerBandBreach => "LOWER_BAND_BREACH",
        };
        f.write_str(name)
    }
}

/// A detected event. `strength` is kind-specific: relative MA spread for
/// crosses, volume ratio for confirmations, loss fraction for stop-losses and
/// distance past the band (in band widths) for breaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub strength: f64,
}

pub fn detect_crossovers(short: &IndicatorSeries, long: &IndicatorSeries) -> Vec<Signal> {
    let mut signals = Vec::new();
    let mut last_side: Option<Ordering> = None;
    let mut prev: Option<(f64, f64)> = None;

    let len = short.len().min(long.len());
    for i in 0..len {
        let current = short.simple_at(i).zip(long.simple_at(i));
        let Some((s, l)) = current else {
            prev = None;
            continue;
        };
        let side = s.partial_cmp(&l).unwrap_or(Ordering::Equal);

        if let Some((ps, pl)) = prev {
            let kind = match side {
                Ordering::Greater if ps <= pl && last_side != Some(Ordering::Greater) => {
                    Some(SignalKind::GoldenCross)
                }
                Ordering::Less if ps >= pl && last_side != Some(Ordering::Less) => {
                    Some(SignalKind::DeathCross)
                }
                _ => None,
            };
            if let Some(kind) = kind {
                signals.push(Signal {
                    date: short.values[i].date,
                    kind,
                    strength: relative_spread(s, l),
                });
            }
        }

        if side != Ordering::Equal {
            last_side = Some(side);
        }
        prev = current;
    }

    signals
}

fn relative_spread(short: f64, long: f64) -> f64 {
    if long != 0.0 {
        (short - long) / long
    } else {
        0.0
    }
}

/// Filter crosses down to those on above-average volume.
///
/// `volume_average` must be a trailing volume mean aligned with `bars`; the
/// value at `t-1` is the average of the window that ends the day before `t`.
pub fn detect_volume_confirmed(
    bars: &[Bar],
    crosses: &[Signal],
    volume_average: &IndicatorSeries,
    multiplier: f64,
) -> Vec<Signal> {
    crosses
        .iter()
        .filter_map(|cross| {
            let kind = match cross.kind {
                SignalKind::GoldenCross => SignalKind::VolumeConfirmedBuy,
                SignalKind::DeathCross => SignalKind::VolumeConfirmedSell,
                _ => return None,
            };
            let t = bars.binary_search_by_key(&cross.date, |b| b.date).ok()?;
            if t == 0 {
                return None;
            }
            let average = volume_average.simple_at(t - 1)?;
            let volume = bars[t].volume as f64;
            if volume <= average * multiplier {
                return None;
            }
            let strength = if average > 0.0 {
                volume / average
            } else {
                f64::INFINITY
            };
            Some(Signal {
                date: cross.date,
                kind,
                strength,
            })
        })
        .collect()
}

pub fn detect_band_breaches(bars: &[Bar], bands: &IndicatorSeries) -> Vec<Signal> {
    let band_at = |i: usize| match bands.value_at(i) {
        Some(IndicatorValue::Bollinger { upper, lower, .. }) => Some((upper, lower)),
        _ => None,
    };

    let mut signals = Vec::new();
    for t in 1..bars.len().min(bands.len()) {
        let (Some((upper, lower)), Some((prev_upper, prev_lower))) = (band_at(t), band_at(t - 1))
        else {
            continue;
        };
        let close = bars[t].close;
        let prev_close = bars[t - 1].close;
        let width = upper - lower;
        let scaled = |distance: f64| if width > 0.0 { distance / width } else { 0.0 };

        if close > upper && prev_close <= prev_upper {
            signals.push(Signal {
                date: bars[t].date,
                kind: SignalKind::UpperBandBreach,
                strength: scaled(close - upper),
            });
        } else if close < lower && prev_close >= prev_lower {
            signals.push(Signal {
                date: bars[t].date,
                kind: SignalKind::LowerBandBreach,
                strength: scaled(lower - close),
            });
        }
    }
    signals
}

/// Run every rule and merge the results in date order.
///
/// Indicators missing from `indicators` are treated as never ready.
pub fn detect_signals(
    bars: &[Bar],
    indicators: &IndicatorMap,
    config: &IndicatorConfig,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    if let (Some(short), Some(long)) = (
        indicators.get(&config.short_ma()),
        indicators.get(&config.long_ma()),
    ) {
        let crosses = detect_crossovers(short, long);
        if let Some(volume_average) = indicators.get(&config.volume_average()) {
            signals.extend(detect_volume_confirmed(
                bars,
                &crosses,
                volume_average,
                config.volume_multiplier,
            ));
        }
        signals.extend(crosses);
    }

    if let Some(bands) = indicators.get(&config.bands()) {
        signals.extend(detect_band_breaches(bars, bands));
    }

    signals.sort_by_key(|s| (s.date, s.kind));
    signals
}
