//! Fill simulation: all-in entries and full exits at the bar's close.
//!
//! No commissions or slippage are modelled; every fill happens at the close
//! of the bar that triggered it.

use chrono::NaiveDate;

use super::portfolio::Portfolio;
use super::position::{ExitReason, Position, PositionState, Trade};

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { shares: u64, price: f64, cost: f64 },
    /// Cash does not cover a single share.
    InsufficientCapital,
    /// A position is already open.
    AlreadyLong,
}

/// Enter a long position with all available cash.
///
/// 1. shares = floor(cash / price), less one while shares × price rounds
///    above cash
/// 2. If shares == 0, return InsufficientCapital
/// 3. Deduct shares × price from cash
/// 4. Move the portfolio to `Long`
pub fn enter_long(portfolio: &mut Portfolio, price: f64, date: NaiveDate) -> EntryResult {
    if !portfolio.is_flat() {
        return EntryResult::AlreadyLong;
    }
    if price <= 0.0 || !price.is_finite() {
        return EntryResult::InsufficientCapital;
    }

    let mut shares = (portfolio.cash / price).floor() as u64;
    while shares > 0 && shares as f64 * price > portfolio.cash {
        shares -= 1;
    }
    if shares == 0 {
        return EntryResult::InsufficientCapital;
    }

    let cost = shares as f64 * price;
    portfolio.cash -= cost;
    portfolio.state = PositionState::Long(Position {
        entry_date: date,
        entry_price: price,
        shares,
    });

    EntryResult::Entered {
        shares,
        price,
        cost,
    }
}

/// Close the open position at `price`, crediting the proceeds and recording
/// the trade. Returns `None` when flat.
pub fn exit_position(
    portfolio: &mut Portfolio,
    price: f64,
    date: NaiveDate,
    reason: ExitReason,
) -> Option<Trade> {
    let PositionState::Long(position) = std::mem::take(&mut portfolio.state) else {
        return None;
    };

    portfolio.cash += position.market_value(price);
    let trade = Trade::close(position, date, price, reason);
    portfolio.record_trade(trade.clone());
    Some(trade)
}
