//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::MarketSnapshot;
use crate::domain::batch::{BacktestJob, BatchOutcome, run_batch};
use crate::domain::config_validation::{RunSettings, load_run_settings};
use crate::domain::error::BanktraderError;
use crate::domain::indicator::macd;
use crate::domain::indicator::{IndicatorType, IndicatorValue};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::strategy::StrategyKind;
use crate::domain::universe::{STOCKS, normalize_symbol, stock_name, validate_universe};
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(
    name = "banktrader",
    about = "Indicator and crossover-strategy backtester for Taiwan bank stocks"
)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest for every configured code
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Backtest a single code instead of the configured list
        #[arg(long)]
        code: Option<String>,
        /// golden-cross or volume-confirmed
        #[arg(long)]
        strategy: Option<StrategyKind>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Print the trade ledger for each code
        #[arg(long)]
        trades: bool,
    },
    /// Show the latest indicator values and market snapshot for a code
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the supported symbols, marking those with data in --data-dir
    ListSymbols {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            code,
            strategy,
            data_dir,
            trades,
        } => run_backtest(&config, code.as_deref(), strategy, data_dir, trades),
        Command::Indicators {
            config,
            code,
            data_dir,
        } => run_indicators(&config, &code, data_dir),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(data_dir),
    }
}

fn fail(err: BanktraderError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, BanktraderError> {
    FileConfigAdapter::from_file(path)
}

/// Load and validate settings, then apply command-line overrides.
pub fn resolve_settings(
    config_path: &PathBuf,
    code_override: Option<&str>,
    strategy_override: Option<StrategyKind>,
    data_dir_override: Option<PathBuf>,
) -> Result<RunSettings, BanktraderError> {
    let adapter = load_config(config_path)?;
    let mut settings = load_run_settings(&adapter)?;

    if let Some(code) = code_override {
        settings.codes = vec![normalize_symbol(code)?];
    }
    if let Some(strategy) = strategy_override {
        settings.backtest.strategy = strategy;
    }
    if let Some(dir) = data_dir_override {
        settings.data_dir = dir;
    }

    info!(
        config = %config_path.display(),
        codes = settings.codes.len(),
        strategy = %settings.backtest.strategy,
        "config loaded"
    );
    Ok(settings)
}

fn run_backtest(
    config_path: &PathBuf,
    code_override: Option<&str>,
    strategy_override: Option<StrategyKind>,
    data_dir_override: Option<PathBuf>,
    show_trades: bool,
) -> ExitCode {
    let settings =
        match resolve_settings(config_path, code_override, strategy_override, data_dir_override) {
            Ok(s) => s,
            Err(e) => return fail(e),
        };

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let validation = match validate_universe(
        &data_port,
        &settings.codes,
        settings.start_date,
        settings.end_date,
    ) {
        Ok(v) => v,
        Err(e) => return fail(e),
    };

    for skipped in &validation.skipped {
        eprintln!("warning: skipped {} ({:?})", skipped.code, skipped.reason);
    }

    let jobs: Vec<BacktestJob> = validation
        .series
        .into_iter()
        .map(|series| BacktestJob {
            series,
            config: settings.backtest.clone(),
        })
        .collect();

    eprintln!(
        "Running {} backtest(s), strategy {}",
        jobs.len(),
        settings.backtest.strategy
    );

    let mut first_error = None;
    for outcome in run_batch(&jobs) {
        match outcome {
            Ok(outcome) => {
                print_summary(&outcome);
                if show_trades {
                    print_trades(&outcome);
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => ExitCode::from(&e),
        None => ExitCode::SUCCESS,
    }
}

fn print_summary(outcome: &BatchOutcome) {
    let s = &outcome.summary;
    let name = stock_name(&outcome.code).unwrap_or("");
    eprintln!("\n=== {} {} ===", outcome.code, name);
    eprintln!("Ending Equity:    {:.2}", outcome.result.ending_equity);
    eprintln!("Total Return:     {:.2}%", s.total_return * 100.0);
    eprintln!("Buy & Hold:       {:.2}%", s.buy_and_hold_return * 100.0);
    eprintln!("Excess Return:    {:.2}%", s.excess_return * 100.0);
    eprintln!("Volatility:       {:.2}%", s.volatility * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", s.sharpe_ratio);
    eprintln!(
        "Max Drawdown:     -{:.1}% ({} bars)",
        s.max_drawdown * 100.0,
        s.max_drawdown_duration
    );
    eprintln!(
        "Total Trades:     {} ({} won, {} lost)",
        s.total_trades, s.winning_trades, s.losing_trades
    );
    eprintln!("Win Rate:         {:.1}%", s.win_rate * 100.0);
    eprintln!("Avg Trade:        {:.2}%", s.avg_trade_return * 100.0);
}

fn print_trades(outcome: &BatchOutcome) {
    if outcome.result.trades.is_empty() {
        eprintln!("  (no trades)");
        return;
    }
    for t in &outcome.result.trades {
        eprintln!(
            "  {} @ {:.2} -> {} @ {:.2}  {:>6} sh  {:+.2}%  {}",
            t.entry_date,
            t.entry_price,
            t.exit_date,
            t.exit_price,
            t.shares,
            t.return_pct * 100.0,
            t.exit_reason
        );
    }
}

fn format_value(value: Option<IndicatorValue>) -> String {
    match value {
        None => "n/a".to_string(),
        Some(IndicatorValue::Simple(v)) => format!("{:.2}", v),
        Some(IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        }) => format!("upper {:.2}  middle {:.2}  lower {:.2}", upper, middle, lower),
        Some(IndicatorValue::Macd {
            line,
            signal,
            histogram,
        }) => format!("line {:.3}  signal {:.3}  hist {:.3}", line, signal, histogram),
    }
}

fn run_indicators(
    config_path: &PathBuf,
    code: &str,
    data_dir_override: Option<PathBuf>,
) -> ExitCode {
    let settings = match resolve_settings(config_path, Some(code), None, data_dir_override) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let Some(code) = settings.codes.first() else {
        return fail(BanktraderError::InvalidSymbol {
            symbol: code.to_string(),
        });
    };

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let series = match data_port.fetch_series(code, settings.start_date, settings.end_date) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let config = &settings.backtest.indicators;

    let mut types = config.required_indicators();
    types.push(IndicatorType::Stddev(config.bb_window));
    types.push(IndicatorType::Macd {
        fast: macd::DEFAULT_FAST,
        slow: macd::DEFAULT_SLOW,
        signal: macd::DEFAULT_SIGNAL,
    });
    let indicators = compute_indicators(series.bars(), &types);

    let Some(snapshot) = MarketSnapshot::compute(&series, config) else {
        return fail(BanktraderError::NoData { code: code.clone() });
    };

    println!(
        "{} {}  {}  close {:.2}",
        code,
        stock_name(code).unwrap_or(""),
        snapshot.date,
        snapshot.close
    );
    for t in &types {
        let latest = indicators
            .get(t)
            .and_then(|s| s.latest())
            .and_then(|p| p.value);
        println!("  {:<18} {}", t.to_string(), format_value(latest));
    }
    println!("  trend              {}", snapshot.trend);
    println!("  volume             {}", snapshot.volume_trend);
    println!(
        "  support            {:.2}\n  resistance         {:.2}",
        snapshot.levels.support, snapshot.levels.resistance
    );
    match snapshot.volatility {
        Some(v) => println!("  volatility         {:.2}%", v * 100.0),
        None => println!("  volatility         n/a"),
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let settings = match resolve_settings(config_path, None, None, None) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let bt = &settings.backtest;
    eprintln!("  strategy:        {}", bt.strategy);
    eprintln!("  initial capital: {:.2}", bt.initial_capital);
    match bt.effective_stop_loss() {
        Some(pct) => eprintln!("  stop-loss:       {:.1}%", pct * 100.0),
        None => eprintln!("  stop-loss:       none"),
    }
    eprintln!(
        "  moving averages: {} / {}",
        bt.indicators.ma_short, bt.indicators.ma_long
    );
    eprintln!("  codes:           {}", settings.codes.join(", "));
    eprintln!("  data dir:        {}", settings.data_dir.display());
    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}

fn run_list_symbols(data_dir: Option<PathBuf>) -> ExitCode {
    let Some(dir) = data_dir else {
        for (code, name) in STOCKS {
            println!("{}\t{}", code, name);
        }
        return ExitCode::SUCCESS;
    };

    let available = match CsvAdapter::new(dir.clone()).list_symbols() {
        Ok(symbols) => symbols,
        Err(e) => return fail(e),
    };
    for (code, name) in STOCKS {
        let marker = if available.iter().any(|s| s == code) { "data" } else { "-" };
        println!("{}\t{}\t{}", code, name, marker);
    }
    let covered = STOCKS
        .iter()
        .filter(|(code, _)| available.iter().any(|s| s == code))
        .count();
    eprintln!("{} of {} symbols have data in {}", covered, STOCKS.len(), dir.display());
    ExitCode::SUCCESS
}
