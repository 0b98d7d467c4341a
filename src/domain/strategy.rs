//! Strategy selection: which signals open and close a position.

use std::fmt;
use std::str::FromStr;

use crate::domain::signal::SignalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Buy on a golden cross, sell on a death cross.
    GoldenCross,
    /// Buy on a volume-confirmed golden cross; stop-loss protected.
    VolumeConfirmed,
}

/// Stop-loss used by the volume strategy when none is configured.
pub const DEFAULT_VOLUME_STOP_LOSS: f64 = 0.10;

impl StrategyKind {
    pub fn buy_signal(self) -> SignalKind {
        match self {
            StrategyKind::GoldenCross => SignalKind::GoldenCross,
            StrategyKind::VolumeConfirmed => SignalKind::VolumeConfirmedBuy,
        }
    }

    /// `confirm_exits` only affects the volume strategy, which otherwise exits
    /// on any death cross.
    pub fn sell_signal(self, confirm_exits: bool) -> SignalKind {
        match self {
            StrategyKind::GoldenCross => SignalKind::DeathCross,
            StrategyKind::VolumeConfirmed if confirm_exits => SignalKind::VolumeConfirmedSell,
            StrategyKind::VolumeConfirmed => SignalKind::DeathCross,
        }
    }

    pub fn default_stop_loss(self) -> Option<f64> {
        match self {
            StrategyKind::GoldenCross => None,
            StrategyKind::VolumeConfirmed => Some(DEFAULT_VOLUME_STOP_LOSS),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::GoldenCross => "golden_cross",
            StrategyKind::VolumeConfirmed => "volume_confirmed",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "golden_cross" => Ok(StrategyKind::GoldenCross),
            "volume_confirmed" => Ok(StrategyKind::VolumeConfirmed),
            other => Err(format!(
                "unknown strategy '{}' (expected golden_cross or volume_confirmed)",
                other
            )),
        }
    }
}
