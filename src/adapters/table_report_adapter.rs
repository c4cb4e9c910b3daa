//! Delimited-text report adapter.
//!
//! One row per bar: date, OHLCV, one column per indicator output, and a
//! buy/sell marker column. Indicator cells are empty while the indicator
//! is still in warmup, never zero-filled. Multi-valued indicators expand
//! to one column per output, suffixed with the output name.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::backtest::BacktestRun;
use crate::domain::error::TradesimError;
use crate::domain::indicator::{IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::SignalKind;
use crate::ports::report_port::ReportPort;

pub struct TableReportAdapter {
    delimiter: u8,
}

impl TableReportAdapter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for TableReportAdapter {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl ReportPort for TableReportAdapter {
    fn write(
        &self,
        run: &BacktestRun,
        bars: &[OhlcvBar],
        output_path: &str,
    ) -> Result<(), TradesimError> {
        // fixed column order: sort indicators by display name
        let mut types: Vec<&IndicatorType> = run.indicators.keys().collect();
        types.sort_by_key(|t| t.to_string());

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(output_path)
            .map_err(csv_error)?;

        let mut header: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for indicator_type in &types {
            let name = indicator_type.to_string();
            match indicator_type {
                IndicatorType::Macd { .. } => {
                    header.push(format!("{} line", name));
                    header.push(format!("{} signal", name));
                    header.push(format!("{} histogram", name));
                }
                IndicatorType::Bollinger { .. } => {
                    header.push(format!("{} upper", name));
                    header.push(format!("{} middle", name));
                    header.push(format!("{} lower", name));
                }
                _ => header.push(name),
            }
        }
        header.push("signal".to_string());
        writer.write_record(&header).map_err(csv_error)?;

        let signal_by_date: HashMap<NaiveDate, SignalKind> =
            run.events.iter().map(|e| (e.date, e.kind)).collect();

        for (i, bar) in bars.iter().enumerate() {
            let mut row: Vec<String> = vec![
                bar.date.to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];

            for indicator_type in &types {
                let point = run.indicators[*indicator_type].values.get(i);
                let width = match indicator_type {
                    IndicatorType::Macd { .. } | IndicatorType::Bollinger { .. } => 3,
                    _ => 1,
                };
                match point {
                    Some(p) if p.valid => match p.value {
                        IndicatorValue::Simple(v) => row.push(v.to_string()),
                        IndicatorValue::Macd {
                            line,
                            signal,
                            histogram,
                        } => {
                            row.push(line.to_string());
                            row.push(signal.to_string());
                            row.push(histogram.to_string());
                        }
                        IndicatorValue::Bollinger {
                            upper,
                            middle,
                            lower,
                        } => {
                            row.push(upper.to_string());
                            row.push(middle.to_string());
                            row.push(lower.to_string());
                        }
                    },
                    _ => row.extend(std::iter::repeat(String::new()).take(width)),
                }
            }

            row.push(match signal_by_date.get(&bar.date) {
                Some(SignalKind::Buy) => "buy".to_string(),
                Some(SignalKind::Sell) => "sell".to_string(),
                None => String::new(),
            });

            writer.write_record(&row).map_err(csv_error)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> TradesimError {
    TradesimError::Data {
        reason: format!("report write error: {}", e),
    }
}
