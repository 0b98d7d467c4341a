//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_helpers;
pub mod signal;
pub mod strategy;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod backtest;
pub mod batch;
pub mod metrics;
pub mod analysis;
pub mod universe;
pub mod config_validation;
pub mod error;
