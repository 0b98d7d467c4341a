//! Backtest engine and event loop.
//!
//! Walks the bars once, in order. Per bar:
//!
//! 1. Long from an earlier bar: stop-loss first, then the strategy's sell
//!    signal. Either closes the position at the close.
//! 2. Flat: the strategy's buy signal opens an all-in position at the close.
//! 3. Equity is recorded.
//!
//! At most one state transition happens per bar. A position still open after
//! the last bar is closed at the last close with `EndOfPeriod`.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::BanktraderError;
use super::execution::{EntryResult, enter_long, exit_position};
use super::indicator_helpers::{IndicatorConfig, compute_indicators};
use super::ohlcv::{Bar, SeriesStore};
use super::portfolio::{EquityPoint, Portfolio};
use super::position::{ExitReason, PositionState, Trade};
use super::signal::{Signal, SignalKind, detect_signals};
use super::strategy::StrategyKind;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.01;

const SECTION: &str = "backtest";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub strategy: StrategyKind,
    /// Fractional stop-loss; `None` falls back to the strategy default.
    pub stop_loss_pct: Option<f64>,
    pub confirm_exits: bool,
    pub risk_free_rate: f64,
    pub indicators: IndicatorConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            strategy: StrategyKind::GoldenCross,
            stop_loss_pct: None,
            confirm_exits: false,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            indicators: IndicatorConfig::default(),
        }
    }
}

impl BacktestConfig {
    pub fn effective_stop_loss(&self) -> Option<f64> {
        self.stop_loss_pct.or(self.strategy.default_stop_loss())
    }

    pub fn validate(&self) -> Result<(), BanktraderError> {
        if !(self.initial_capital > 0.0 && self.initial_capital.is_finite()) {
            return Err(BanktraderError::invalid(
                SECTION,
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
        if let Some(pct) = self.stop_loss_pct {
            if !(pct > 0.0 && pct < 1.0) {
                return Err(BanktraderError::invalid(
                    SECTION,
                    "stop_loss_pct",
                    "stop_loss_pct must be between 0 and 1 (exclusive)",
                ));
            }
        }
        if !(0.0..1.0).contains(&self.risk_free_rate) {
            return Err(BanktraderError::invalid(
                SECTION,
                "risk_free_rate",
                "risk_free_rate must be between 0 and 1",
            ));
        }
        self.indicators.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub ending_equity: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Detected signals plus the stop-loss signals raised during the run.
    pub signals: Vec<Signal>,
}

impl BacktestResult {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.equity_curve.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.equity_curve.last().map(|p| p.date)
    }
}

/// Compute indicators and signals for `series`, then simulate `config.strategy`.
pub fn run_backtest(
    series: &SeriesStore,
    config: &BacktestConfig,
) -> Result<BacktestResult, BanktraderError> {
    config.validate()?;

    info!(
        code = series.code(),
        bars = series.len(),
        strategy = %config.strategy,
        "backtest started"
    );

    let bars = series.bars();
    let indicators = compute_indicators(bars, &config.indicators.required_indicators());
    let signals = detect_signals(bars, &indicators, &config.indicators);
    debug!(code = series.code(), signals = signals.len(), "signals detected");

    let result = simulate(bars, signals, config);

    info!(
        code = series.code(),
        trades = result.trades.len(),
        ending_equity = result.ending_equity,
        "backtest finished"
    );
    Ok(result)
}

/// Run the state machine over pre-computed, date-ordered signals.
///
/// `config` is assumed valid.
pub fn simulate(
    bars: &[Bar],
    mut signals: Vec<Signal>,
    config: &BacktestConfig,
) -> BacktestResult {
    let buy = config.strategy.buy_signal();
    let sell = config.strategy.sell_signal(config.confirm_exits);
    let stop_loss = config.effective_stop_loss();

    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut stop_signals = Vec::new();
    let mut cursor = 0;

    for bar in bars {
        while cursor < signals.len() && signals[cursor].date < bar.date {
            cursor += 1;
        }
        let start = cursor;
        while cursor < signals.len() && signals[cursor].date == bar.date {
            cursor += 1;
        }
        let today = &signals[start..cursor];
        let fired = |kind: SignalKind| today.iter().any(|s| s.kind == kind);

        match &portfolio.state {
            PositionState::Long(position) => {
                let stopped = stop_loss.filter(|&pct| position.should_stop_loss(bar.close, pct));
                let exit = if stopped.is_some() {
                    let strength = 1.0 - bar.close / position.entry_price;
                    stop_signals.push(Signal {
                        date: bar.date,
                        kind: SignalKind::StopLoss,
                        strength,
                    });
                    Some(ExitReason::StopLoss)
                } else if fired(sell) {
                    ExitReason::from_signal(sell)
                } else {
                    None
                };

                if let Some(reason) = exit {
                    if let Some(trade) =
                        exit_position(&mut portfolio, bar.close, bar.date, reason)
                    {
                        debug!(
                            date = %trade.exit_date,
                            price = trade.exit_price,
                            pnl = trade.pnl,
                            reason = %trade.exit_reason,
                            "position closed"
                        );
                    }
                }
            }
            PositionState::Flat => {
                if fired(buy) {
                    match enter_long(&mut portfolio, bar.close, bar.date) {
                        EntryResult::Entered { shares, price, .. } => {
                            debug!(date = %bar.date, shares, price, "position opened");
                        }
                        EntryResult::InsufficientCapital | EntryResult::AlreadyLong => {
                            debug!(date = %bar.date, cash = portfolio.cash, "buy signal skipped");
                        }
                    }
                }
            }
        }

        let equity = portfolio.total_equity(bar.close);
        portfolio.record_equity(bar.date, equity);
    }

    if let Some(last) = bars.last() {
        if let Some(trade) =
            exit_position(&mut portfolio, last.close, last.date, ExitReason::EndOfPeriod)
        {
            debug!(date = %trade.exit_date, pnl = trade.pnl, "position closed at end of period");
        }
    }

    if !stop_signals.is_empty() {
        signals.extend(stop_signals);
        signals.sort_by_key(|s| (s.date, s.kind));
    }

    BacktestResult {
        initial_capital: portfolio.initial_capital,
        ending_equity: portfolio.cash,
        trades: portfolio.closed_trades,
        equity_curve: portfolio.equity_curve,
        signals,
    }
}
