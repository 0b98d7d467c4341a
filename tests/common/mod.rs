#![allow(dead_code)]

use banktrader::domain::error::BanktraderError;
pub use banktrader::domain::ohlcv::{Bar, SeriesStore};
use banktrader::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, BanktraderError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(BanktraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start_date.is_none_or(|s| b.date >= s))
                    .filter(|b| end_date.is_none_or(|e| b.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, BanktraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(day: NaiveDate, close: f64, volume: u64) -> Bar {
    Bar {
        date: day,
        open: close,
        high: close + 1.0,
        low: (close - 1.0).max(0.0),
        close,
        volume,
    }
}

/// Consecutive daily bars starting 2024-01-01.
pub fn bars_from_closes(closes: &[f64], volumes: &[u64]) -> Vec<Bar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            make_bar(start + chrono::Duration::days(i as i64), close, volume)
        })
        .collect()
}

pub fn series_from_closes(code: &str, closes: &[f64]) -> SeriesStore {
    SeriesStore::new(code, bars_from_closes(closes, &vec![1_000; closes.len()])).unwrap()
}

/// Closes of 90 for ten days, 100 for ten, then 90 for five: with MA windows
/// 2/4 this gives one golden cross on day 10 and one death cross on day 20.
pub fn cross_closes() -> Vec<f64> {
    let mut closes = vec![90.0; 10];
    closes.extend(vec![100.0; 10]);
    closes.extend(vec![90.0; 5]);
    closes
}

pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<Bar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let price = start_price + i as f64;
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open: price,
                high: price + 1.0,
                low: price - 1.0,
                close: price,
                volume: 1000,
            }
        })
        .collect()
}

pub fn write_csv(dir: &Path, code: &str, bars: &[Bar]) {
    let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.close, b.volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", code)), content).unwrap();
}
