//! OHLCV bar representation and the per-instrument series store.

use chrono::NaiveDate;

use super::error::BanktraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Ordered daily bars for one instrument.
///
/// Dates are strictly increasing; non-trading days are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStore {
    code: String,
    bars: Vec<Bar>,
}

impl SeriesStore {
    pub fn new(code: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BanktraderError> {
        let code = code.into();
        for (i, bar) in bars.iter().enumerate() {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite() || *p < 0.0) {
                return Err(BanktraderError::InvalidSeries {
                    code,
                    reason: format!("bar {} has a negative or non-finite price", bar.date),
                });
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(BanktraderError::InvalidSeries {
                    code,
                    reason: format!(
                        "dates not strictly increasing at {} (previous {})",
                        bar.date,
                        bars[i - 1].date
                    ),
                });
            }
        }
        Ok(Self { code, bars })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_close(&self) -> Option<f64> {
        self.bars.first().map(|b| b.close)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}
