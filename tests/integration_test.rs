mod common;

use banktrader::domain::backtest::{BacktestConfig, run_backtest};
use banktrader::domain::batch::{BacktestJob, run_batch};
use banktrader::domain::error::BanktraderError;
use banktrader::domain::indicator_helpers::IndicatorConfig;
use banktrader::domain::metrics::PerformanceSummary;
use banktrader::domain::position::ExitReason;
use banktrader::domain::signal::SignalKind;
use banktrader::domain::strategy::StrategyKind;
use banktrader::domain::universe::{SkipReason, validate_universe};
use banktrader::ports::data_port::DataPort;
use common::*;

fn fast_indicators() -> IndicatorConfig {
    IndicatorConfig {
        ma_short: 2,
        ma_long: 4,
        rsi_period: 3,
        bb_window: 4,
        bb_k: 2.0,
        volume_window: 3,
        volume_multiplier: 1.2,
    }
}

fn fast_config(strategy: StrategyKind) -> BacktestConfig {
    BacktestConfig {
        strategy,
        indicators: fast_indicators(),
        ..Default::default()
    }
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

mod pipeline {
    use super::*;

    #[test]
    fn golden_then_death_cross_round_trip() {
        let port = MockDataPort::new().with_bars(
            "2881.TW",
            bars_from_closes(&cross_closes(), &vec![1_000; cross_closes().len()]),
        );
        let universe = validate_universe(&port, &codes(&["2881.TW"]), None, None).unwrap();
        assert_eq!(universe.series.len(), 1);

        let jobs: Vec<BacktestJob> = universe
            .series
            .into_iter()
            .map(|series| BacktestJob {
                series,
                config: fast_config(StrategyKind::GoldenCross),
            })
            .collect();
        let outcome = run_batch(&jobs).remove(0).unwrap();

        assert_eq!(outcome.code, "2881.TW");
        assert_eq!(outcome.result.trades.len(), 1);
        let trade = &outcome.result.trades[0];
        assert_eq!(trade.entry_date, date(2024, 1, 11));
        assert_eq!(trade.exit_date, date(2024, 1, 21));
        assert_eq!(trade.exit_reason, ExitReason::DeathCross);

        let s = &outcome.summary;
        assert_eq!(s.total_trades, 1);
        assert_eq!(s.losing_trades, 1);
        assert!((s.total_return - (-0.10)).abs() < 1e-9);
        assert!(s.buy_and_hold_return.abs() < 1e-12);
        assert!((s.excess_return - (-0.10)).abs() < 1e-9);
    }

    #[test]
    fn signals_are_ordered_by_date() {
        let closes = cross_closes();
        let series = series_from_closes("2882.TW", &closes);
        let result = run_backtest(&series, &fast_config(StrategyKind::GoldenCross)).unwrap();

        assert!(result.signals.windows(2).all(|w| w[0].date <= w[1].date));
        let kinds: Vec<SignalKind> = result
            .signals
            .iter()
            .filter(|s| matches!(s.kind, SignalKind::GoldenCross | SignalKind::DeathCross))
            .map(|s| s.kind)
            .collect();
        assert_eq!(kinds, vec![SignalKind::GoldenCross, SignalKind::DeathCross]);
    }

    #[test]
    fn steady_rise_never_crosses_with_defaults() {
        let series = SeriesStore::new("2884.TW", generate_bars("2024-01-01", 120, 20.0)).unwrap();
        let result = run_backtest(&series, &BacktestConfig::default()).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve.len(), 120);
        let summary = PerformanceSummary::compute(
            &result,
            series.first_close().unwrap(),
            series.last_close().unwrap(),
            0.01,
        );
        assert_eq!(summary.total_return, 0.0);
        assert!(summary.buy_and_hold_return > 5.0);
    }

    #[test]
    fn volume_confirmed_needs_volume_spike() {
        let closes = cross_closes();
        let mut volumes = vec![1_000; closes.len()];
        let quiet = SeriesStore::new("2886.TW", bars_from_closes(&closes, &volumes)).unwrap();
        volumes[10] = 4_000;
        let loud = SeriesStore::new("2886.TW", bars_from_closes(&closes, &volumes)).unwrap();

        let config = fast_config(StrategyKind::VolumeConfirmed);
        assert!(run_backtest(&quiet, &config).unwrap().trades.is_empty());

        let result = run_backtest(&loud, &config).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_date, date(2024, 1, 11));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let series = series_from_closes("2891.TW", &cross_closes());
        let config = fast_config(StrategyKind::GoldenCross);

        let first = run_backtest(&series, &config).unwrap();
        let second = run_backtest(&series, &config).unwrap();
        assert_eq!(first.trades, second.trades);
        assert_eq!(first.equity_curve, second.equity_curve);
        assert_eq!(first.ending_equity, second.ending_equity);
    }
}

mod universe {
    use super::*;

    #[test]
    fn partial_universe_runs_what_loads() {
        let port = MockDataPort::new()
            .with_bars("2881.TW", generate_bars("2024-01-01", 60, 50.0))
            .with_error("2882.TW", "connection reset");
        let result =
            validate_universe(&port, &codes(&["2881.TW", "2882.TW", "2883.TW"]), None, None)
                .unwrap();

        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series[0].code(), "2881.TW");
        assert_eq!(result.skipped.len(), 2);
        assert!(matches!(
            result.skipped[0].reason,
            SkipReason::Failed(ref r) if r.contains("connection reset")
        ));
        assert_eq!(result.skipped[1].reason, SkipReason::NoData);
    }

    #[test]
    fn nothing_loaded_is_an_error() {
        let port = MockDataPort::new().with_error("2881.TW", "down");
        let result = validate_universe(&port, &codes(&["2881.TW", "2882.TW"]), None, None);
        assert!(matches!(result, Err(BanktraderError::NoData { .. })));
    }

    #[test]
    fn date_range_is_applied() {
        let port = MockDataPort::new().with_bars("2881.TW", generate_bars("2024-01-01", 60, 50.0));
        let result = validate_universe(
            &port,
            &codes(&["2881.TW"]),
            Some(date(2024, 1, 11)),
            Some(date(2024, 1, 20)),
        )
        .unwrap();

        let series = &result.series[0];
        assert_eq!(series.len(), 10);
        assert_eq!(series.bars()[0].date, date(2024, 1, 11));
    }

    #[test]
    fn unsorted_source_is_rejected() {
        let mut bars = generate_bars("2024-01-01", 5, 50.0);
        bars.swap(1, 2);
        let port = MockDataPort::new().with_bars("2881.TW", bars);

        let result = port.fetch_series("2881.TW", None, None);
        assert!(matches!(result, Err(BanktraderError::InvalidSeries { .. })));
    }
}

mod batch {
    use super::*;

    #[test]
    fn each_code_gets_its_own_portfolio() {
        let jobs: Vec<BacktestJob> = ["2880.TW", "2881.TW", "2882.TW", "2883.TW"]
            .iter()
            .map(|code| BacktestJob {
                series: series_from_closes(code, &cross_closes()),
                config: fast_config(StrategyKind::GoldenCross),
            })
            .collect();

        let outcomes: Vec<_> = run_batch(&jobs).into_iter().map(Result::unwrap).collect();
        assert_eq!(outcomes.len(), 4);
        for outcome in &outcomes {
            assert_eq!(outcome.result.trades.len(), 1);
            assert!((outcome.result.ending_equity - 90_000.0).abs() < 1e-6);
        }
    }
}
