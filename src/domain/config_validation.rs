//! Run-configuration building and validation.
//!
//! Everything is checked before the orchestrator runs: the engine itself
//! never reads ambient state.

use chrono::NaiveDate;

use crate::domain::backtest::DEFAULT_STARTING_CAPITAL;
use crate::domain::error::TradesimError;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub starting_capital: f64,
}

/// Build and validate the `[backtest]` section.
///
/// `symbol_override` (from the CLI) replaces the configured symbol before
/// validation.
pub fn build_run_config(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<RunConfig, TradesimError> {
    let symbol = match symbol_override {
        Some(s) => s.to_string(),
        None => config
            .get_string("backtest", "symbol")
            .unwrap_or_default(),
    };
    let symbol = symbol.trim().to_string();
    if symbol.is_empty() {
        return Err(TradesimError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        });
    }

    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if start_date >= end_date {
        return Err(TradesimError::ConfigInvalid {
            section: "backtest".into(),
            key: "start_date".into(),
            reason: "start_date must be before end_date".into(),
        });
    }

    let starting_capital =
        config.get_double("backtest", "starting_capital", DEFAULT_STARTING_CAPITAL);
    if starting_capital <= 0.0 {
        return Err(TradesimError::ConfigInvalid {
            section: "backtest".into(),
            key: "starting_capital".into(),
            reason: "starting_capital must be positive".into(),
        });
    }

    Ok(RunConfig {
        symbol,
        start_date,
        end_date,
        starting_capital,
    })
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, TradesimError> {
    let value =
        config
            .get_string("backtest", key)
            .ok_or_else(|| TradesimError::ConfigMissing {
                section: "backtest".into(),
                key: key.into(),
            })?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        TradesimError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: format!("invalid {} format, expected YYYY-MM-DD", key),
        }
    })
}
