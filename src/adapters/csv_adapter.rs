//! CSV file data adapter.
//!
//! One file per code at `<base_path>/<code>.csv`. Columns are located by
//! header name (`date`, `open`, `high`, `low`, `close`, `volume`, matched
//! case-insensitively); any other columns, such as `Adj Close`, are ignored.

use crate::domain::error::BanktraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, BanktraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| BanktraderError::DataSource {
                    reason: format!("missing {} column", name),
                })
        };
        Ok(Columns {
            date: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, BanktraderError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| BanktraderError::DataSource {
            reason: format!("missing {} value", name),
        })
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, BanktraderError> {
    let raw = field(record, index, name)?;
    raw.parse().map_err(|e| BanktraderError::DataSource {
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })
}

/// Volumes are sometimes exported as floats (`1234.0`).
fn parse_volume(record: &csv::StringRecord, index: usize) -> Result<u64, BanktraderError> {
    let raw = field(record, index, "volume")?;
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as u64),
        _ => Err(BanktraderError::DataSource {
            reason: format!("invalid volume value '{}'", raw),
        }),
    }
}

/// Accepts `YYYY-MM-DD`, ignoring any trailing time component.
fn parse_date(raw: &str) -> Result<NaiveDate, BanktraderError> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| BanktraderError::DataSource {
        reason: format!("invalid date '{}': {}", raw, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, BanktraderError> {
        let path = self.csv_path(code);
        if !path.exists() {
            return Err(BanktraderError::NoData {
                code: code.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| BanktraderError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| BanktraderError::DataSource {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let columns = Columns::locate(headers)?;
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BanktraderError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date = parse_date(field(&record, columns.date, "date")?)?;
            if start_date.is_some_and(|start| date < start)
                || end_date.is_some_and(|end| date > end)
            {
                continue;
            }

            bars.push(Bar {
                date,
                open: parse_price(&record, columns.open, "open")?,
                high: parse_price(&record, columns.high, "high")?,
                low: parse_price(&record, columns.low, "low")?,
                close: parse_price(&record, columns.close, "close")?,
                volume: parse_volume(&record, columns.volume)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BanktraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BanktraderError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BanktraderError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(".csv") {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
