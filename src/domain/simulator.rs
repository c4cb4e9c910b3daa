//! Single-position portfolio simulator.
//!
//! Replays a signal event sequence against an all-in/all-out account:
//! a Buy converts the whole cash balance to units at that bar's close, a
//! Sell converts the whole unit balance back to cash. The account is
//! always fully in cash or fully invested (`cash == 0` XOR `units == 0`).
//!
//! Events whose precondition does not hold (a Sell while flat, a Buy
//! while invested) are silently ignored: a desynchronized signal cannot
//! corrupt the account, so it is a no-op, never an error.

use chrono::NaiveDate;

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{SignalEvent, SignalKind};

/// One executed trade and the account balances it left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeFill {
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub price: f64,
    pub cash: f64,
    pub units: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub starting_capital: f64,
    pub final_value: f64,
    pub return_pct: f64,
    pub trades: Vec<TradeFill>,
}

impl BacktestResult {
    fn flat(starting_capital: f64) -> Self {
        BacktestResult {
            starting_capital,
            final_value: starting_capital,
            return_pct: 0.0,
            trades: Vec::new(),
        }
    }
}

/// Replay `events` over `bars` in date order.
///
/// Events must be ordered by date, at most one per date (the signal
/// generator guarantees both). An event dated off-series is skipped.
pub fn simulate(bars: &[OhlcvBar], events: &[SignalEvent], starting_capital: f64) -> BacktestResult {
    // an empty series values to the starting capital; nothing to index
    let Some(last_bar) = bars.last() else {
        return BacktestResult::flat(starting_capital);
    };

    let mut cash = starting_capital;
    let mut units = 0.0;
    let mut trades = Vec::new();

    let mut pending = events.iter().peekable();
    for bar in bars {
        while let Some(event) = pending.peek() {
            if event.date > bar.date {
                break;
            }
            if event.date == bar.date {
                match event.kind {
                    SignalKind::Buy if cash > 0.0 => {
                        units = cash / bar.close;
                        cash = 0.0;
                        trades.push(TradeFill {
                            date: bar.date,
                            kind: SignalKind::Buy,
                            price: bar.close,
                            cash,
                            units,
                        });
                    }
                    SignalKind::Sell if units > 0.0 => {
                        cash = units * bar.close;
                        units = 0.0;
                        trades.push(TradeFill {
                            date: bar.date,
                            kind: SignalKind::Sell,
                            price: bar.close,
                            cash,
                            units,
                        });
                    }
                    // precondition not met: ignore
                    _ => {}
                }
            }
            pending.next();
        }
    }

    let final_value = cash + units * last_bar.close;
    let return_pct = if starting_capital > 0.0 {
        100.0 * (final_value - starting_capital) / starting_capital
    } else {
        0.0
    };

    BacktestResult {
        starting_capital,
        final_value,
        return_pct,
        trades,
    }
}
