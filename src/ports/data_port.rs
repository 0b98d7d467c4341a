//! Data access port trait.

use chrono::NaiveDate;

use crate::domain::error::BanktraderError;
use crate::domain::ohlcv::{Bar, SeriesStore};

pub trait DataPort {
    /// Bars for `code` within the inclusive date range, oldest first.
    /// `None` bounds are open.
    fn fetch_bars(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, BanktraderError>;

    /// Codes for which this source holds data.
    fn list_symbols(&self) -> Result<Vec<String>, BanktraderError>;

    /// Fetch and validate into a [`SeriesStore`].
    fn fetch_series(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<SeriesStore, BanktraderError> {
        let bars = self.fetch_bars(code, start_date, end_date)?;
        SeriesStore::new(code, bars)
    }
}
