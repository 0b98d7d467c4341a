//! Parallel execution of independent backtests.
//!
//! Each job owns its series and configuration, so jobs share nothing and a
//! failing job never affects the others.

use rayon::prelude::*;
use tracing::warn;

use super::backtest::{BacktestConfig, BacktestResult, run_backtest};
use super::error::BanktraderError;
use super::metrics::PerformanceSummary;
use super::ohlcv::SeriesStore;

#[derive(Debug, Clone)]
pub struct BacktestJob {
    pub series: SeriesStore,
    pub config: BacktestConfig,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub code: String,
    pub result: BacktestResult,
    pub summary: PerformanceSummary,
}

/// Backtest and summarise one series.
pub fn run_job(job: &BacktestJob) -> Result<BatchOutcome, BanktraderError> {
    let result = run_backtest(&job.series, &job.config)?;
    let summary = PerformanceSummary::compute(
        &result,
        job.series.first_close().unwrap_or(0.0),
        job.series.last_close().unwrap_or(0.0),
        job.config.risk_free_rate,
    );
    Ok(BatchOutcome {
        code: job.series.code().to_string(),
        result,
        summary,
    })
}

/// Run every job on the rayon pool. Results come back in job order.
pub fn run_batch(jobs: &[BacktestJob]) -> Vec<Result<BatchOutcome, BanktraderError>> {
    jobs.par_iter()
        .map(|job| {
            run_job(job).inspect_err(|e| {
                warn!(code = job.series.code(), error = %e, "backtest failed");
            })
        })
        .collect()
}
