//! OHLCV bar representation and price-series invariants.

use chrono::NaiveDate;

use crate::domain::error::TradesimError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Check the price-series invariant: dates strictly ascending, no duplicates.
///
/// An empty series is valid here; whether it is usable is the caller's call
/// (the simulator treats it as a no-trade run, the CLI surfaces it as
/// missing data).
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), TradesimError> {
    for pair in bars.windows(2) {
        if pair[1].date == pair[0].date {
            return Err(TradesimError::Data {
                reason: format!("duplicate bar date {}", pair[0].date),
            });
        }
        if pair[1].date < pair[0].date {
            return Err(TradesimError::Data {
                reason: format!(
                    "bars out of order: {} follows {}",
                    pair[1].date, pair[0].date
                ),
            });
        }
    }
    Ok(())
}
