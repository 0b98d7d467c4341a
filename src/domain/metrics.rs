//! Performance statistics over a finished backtest.

use super::backtest::BacktestResult;
use super::portfolio::EquityPoint;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_trade_return: f64,
    pub max_drawdown: f64,
    /// Longest run of bars spent below a prior equity peak.
    pub max_drawdown_duration: usize,
    pub buy_and_hold_return: f64,
    pub excess_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

impl PerformanceSummary {
    /// Reduce `result` to summary statistics. Never fails: empty ledgers and
    /// flat curves produce zeros.
    pub fn compute(
        result: &BacktestResult,
        first_close: f64,
        last_close: f64,
        risk_free_rate: f64,
    ) -> Self {
        let initial_capital = result.initial_capital;
        let total_return = if initial_capital > 0.0 {
            result.ending_equity / initial_capital - 1.0
        } else {
            0.0
        };

        let total_trades = result.trades.len();
        let winning_trades = result.trades.iter().filter(|t| t.pnl > 0.0).count();
        let losing_trades = result.trades.iter().filter(|t| t.pnl < 0.0).count();

        let (win_rate, avg_trade_return) = if total_trades > 0 {
            let n = total_trades as f64;
            let sum: f64 = result.trades.iter().map(|t| t.return_pct).sum();
            (winning_trades as f64 / n, sum / n)
        } else {
            (0.0, 0.0)
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&result.equity_curve);

        let buy_and_hold_return = if first_close > 0.0 {
            last_close / first_close - 1.0
        } else {
            0.0
        };

        let volatility = annualized_volatility(&result.equity_curve);
        let sharpe_ratio = if volatility > 0.0 {
            (total_return - risk_free_rate) / volatility
        } else {
            0.0
        };

        PerformanceSummary {
            total_return,
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            avg_trade_return,
            max_drawdown,
            max_drawdown_duration,
            buy_and_hold_return,
            excess_return: total_return - buy_and_hold_return,
            volatility,
            sharpe_ratio,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            max_dd = max_dd.max(dd);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}

/// Sample standard deviation of a return series.
pub(crate) fn sample_stddev(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

fn annualized_volatility(equity_curve: &[EquityPoint]) -> f64 {
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            if prev > 0.0 {
                (w[1].equity - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    sample_stddev(&returns)
        .map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
        .unwrap_or(0.0)
}
