//! Open position, position state and the closed-trade ledger entry.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::signal::SignalKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub shares: u64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares as f64 * (price - self.entry_price)
    }

    /// Price at or below which a stop-loss of `pct` (a fraction) triggers.
    pub fn stop_price(&self, pct: f64) -> f64 {
        self.entry_price * (1.0 - pct)
    }

    pub fn should_stop_loss(&self, price: f64, pct: f64) -> bool {
        price <= self.stop_price(pct)
    }
}

/// The simulator holds at most one position at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long(Position),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            PositionState::Flat => None,
            PositionState::Long(position) => Some(position),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    DeathCross,
    VolumeConfirmedSell,
    EndOfPeriod,
}

impl ExitReason {
    /// Exit reason for a sell-class signal; `None` for buy-side or band signals.
    pub fn from_signal(kind: SignalKind) -> Option<Self> {
        match kind {
            SignalKind::StopLoss => Some(ExitReason::StopLoss),
            SignalKind::DeathCross => Some(ExitReason::DeathCross),
            SignalKind::VolumeConfirmedSell => Some(ExitReason::VolumeConfirmedSell),
            SignalKind::GoldenCross
            | SignalKind::VolumeConfirmedBuy
            | SignalKind::UpperBandBreach
            | SignalKind::LowerBandBreach => None,
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::DeathCross => "DEATH_CROSS",
            ExitReason::VolumeConfirmedSell => "VOLUME_CONFIRMED_SELL",
            ExitReason::EndOfPeriod => "END_OF_PERIOD",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub shares: u64,
    pub pnl: f64,
    /// Fractional return on the entry cost (0.05 = 5%).
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Close `position` at `exit_price`, consuming it.
    pub fn close(
        position: Position,
        exit_date: NaiveDate,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        let pnl = position.unrealized_pnl(exit_price);
        let return_pct = if position.entry_price > 0.0 {
            exit_price / position.entry_price - 1.0
        } else {
            0.0
        };
        Trade {
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_date,
            exit_price,
            shares: position.shares,
            pnl,
            return_pct,
            exit_reason,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
