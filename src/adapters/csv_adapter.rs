//! CSV file data adapter.
//!
//! One file per symbol (`<symbol>.csv`) under a base directory, columns
//! `date,open,high,low,close,volume`. Bars come back sorted ascending;
//! a duplicate date in the source is a data error.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, TradesimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TradesimError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TradesimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| TradesimError::Data {
                reason: "missing date column".into(),
            })?;
            let date =
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| TradesimError::Data {
                    reason: format!("invalid date format: {}", e),
                })?;

            let open = parse_field(&record, 1, "open")?;
            let high = parse_field(&record, 2, "high")?;
            let low = parse_field(&record, 3, "low")?;
            let close = parse_field(&record, 4, "close")?;

            let volume: i64 = record
                .get(5)
                .ok_or_else(|| TradesimError::Data {
                    reason: "missing volume column".into(),
                })?
                .parse()
                .map_err(|e| TradesimError::Data {
                    reason: format!("invalid volume value: {}", e),
                })?;

            if open <= 0.0 || high <= 0.0 || low <= 0.0 || close <= 0.0 {
                return Err(TradesimError::Data {
                    reason: format!("non-positive price on {} in {}", date, path.display()),
                });
            }
            if volume < 0 {
                return Err(TradesimError::Data {
                    reason: format!("negative volume on {} in {}", date, path.display()),
                });
            }

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        for pair in bars.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(TradesimError::Data {
                    reason: format!("duplicate date {} in {}", pair[0].date, path.display()),
                });
            }
        }
        Ok(bars)
    }
}

fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, TradesimError> {
    record
        .get(index)
        .ok_or_else(|| TradesimError::Data {
            reason: format!("missing {} column", name),
        })?
        .parse()
        .map_err(|e| TradesimError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TradesimError> {
        let bars: Vec<OhlcvBar> = self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        if bars.is_empty() {
            return Err(TradesimError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TradesimError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TradesimError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradesimError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let bars = self.read_all(symbol)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
