//! Data access port trait.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetch the bars for `symbol` within `[start_date, end_date]`,
    /// sorted ascending by date. Fails with
    /// [`TradesimError::DataUnavailable`] when the source has no bars in
    /// the range — a terminal condition for the run, never retried.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TradesimError>;

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError>;

    /// First date, last date and bar count for `symbol`, or `None` when
    /// the source has nothing for it.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradesimError>;
}
