//! Backtest orchestrator.
//!
//! Composes the pipeline for one run: indicators → signals → simulation.
//! Returns the summary result together with the computed indicator and
//! signal series so report and chart consumers can render per-bar detail
//! without recomputing anything.

use std::collections::HashMap;

use crate::domain::error::TradesimError;
use crate::domain::indicator::{compute_indicators, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{validate_series, OhlcvBar};
use crate::domain::signal::{self, SignalEvent};
use crate::domain::simulator::{simulate, BacktestResult};
use crate::domain::strategy::StrategyKind;

pub const DEFAULT_STARTING_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub strategy: StrategyKind,
    pub result: BacktestResult,
    pub indicators: HashMap<IndicatorType, IndicatorSeries>,
    pub events: Vec<SignalEvent>,
}

/// Run one backtest over `bars`.
///
/// Only the indicators the strategy needs are computed. A series too
/// short for the strategy is a valid input: it produces no signals and a
/// result equal to the starting capital, with an empty trade log.
pub fn run(
    bars: &[OhlcvBar],
    strategy: &StrategyKind,
    starting_capital: f64,
) -> Result<BacktestRun, TradesimError> {
    validate_series(bars)?;

    let indicators = compute_indicators(bars, &strategy.required_indicators());
    let events = signal::generate(strategy, bars, &indicators);
    let result = simulate(bars, &events, starting_capital);

    Ok(BacktestRun {
        strategy: strategy.clone(),
        result,
        indicators,
        events,
    })
}
