//! Exponential Moving Average indicator.
//!
//! k = 2/(span+1), seeded with the first close, then
//! EMA[i] = EMA[i-1] + k*(C[i] - EMA[i-1]).
//! Valid from index 0: the recurrence needs no lookback window.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], span: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    if span == 0 {
        for bar in bars {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
        }
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(span),
            values,
        };
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut ema = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            ema = bar.close;
        } else {
            ema += k * (bar.close - ema);
        }
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Simple(ema),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}
