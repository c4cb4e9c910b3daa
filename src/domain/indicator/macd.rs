//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All three EMAs are first-value-seeded, so the series is valid from
//! index 0. Default parameters: fast=12, slow=26, signal=9.

use crate::domain::indicator::{
    ema::calculate_ema, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_span,
    };

    if fast == 0 || slow == 0 || signal_span == 0 {
        let values = bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            })
            .collect();
        return IndicatorSeries {
            indicator_type,
            values,
        };
    }

    let ema_fast = ema_raw_values(bars, fast);
    let ema_slow = ema_raw_values(bars, slow);

    let mut macd_line: Vec<f64> = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        macd_line.push(ema_fast[i] - ema_slow[i]);
    }

    let k = 2.0 / (signal_span as f64 + 1.0);
    let mut signal_ema = 0.0;
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            signal_ema = macd_line[0];
        } else {
            signal_ema += k * (macd_line[i] - signal_ema);
        }

        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Macd {
                line: macd_line[i],
                signal: signal_ema,
                histogram: macd_line[i] - signal_ema,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[OhlcvBar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

fn ema_raw_values(bars: &[OhlcvBar], span: usize) -> Vec<f64> {
    let series = calculate_ema(bars, span);
    series
        .values
        .iter()
        .map(|p| match p.value {
            IndicatorValue::Simple(v) => v,
            _ => 0.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn macd_at(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.values[i].value {
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => (line, signal, histogram),
            _ => panic!("expected Macd value"),
        }
    }

    #[test]
    fn macd_first_point_is_zero() {
        // both EMAs seed to the first close, so line and signal start at 0
        let bars = make_bars(&[100.0, 102.0, 104.0]);
        let series = calculate_macd(&bars, 2, 4, 3);

        assert!(series.values[0].valid);
        let (line, signal, histogram) = macd_at(&series, 0);
        assert!(line.abs() < f64::EPSILON);
        assert!(signal.abs() < f64::EPSILON);
        assert!(histogram.abs() < f64::EPSILON);
    }

    #[test]
    fn macd_line_is_ema_difference() {
        let bars = make_bars(&[100.0, 110.0, 105.0, 120.0]);
        let series = calculate_macd(&bars, 2, 4, 3);

        let kf = 2.0 / 3.0;
        let ks = 2.0 / 5.0;
        let mut ef = 100.0;
        let mut es = 100.0;
        for (i, price) in [110.0, 105.0, 120.0].iter().enumerate() {
            ef += kf * (price - ef);
            es += ks * (price - es);
            let (line, _, _) = macd_at(&series, i + 1);
            assert!((line - (ef - es)).abs() < 1e-9, "index {}", i + 1);
        }
    }

    #[test]
    fn macd_signal_is_ema_of_line() {
        let bars = make_bars(&[100.0, 110.0, 105.0, 120.0, 115.0]);
        let series = calculate_macd(&bars, 2, 4, 3);

        let k = 2.0 / 4.0;
        let mut expected = macd_at(&series, 0).0;
        for i in 1..bars.len() {
            let (line, signal, histogram) = macd_at(&series, i);
            expected += k * (line - expected);
            assert!((signal - expected).abs() < 1e-9, "index {}", i);
            assert!((histogram - (line - signal)).abs() < 1e-9);
        }
    }

    #[test]
    fn macd_flat_prices_stays_zero() {
        let bars = make_bars(&[100.0; 10]);
        let series = calculate_macd_default(&bars);

        for i in 0..10 {
            let (line, signal, histogram) = macd_at(&series, i);
            assert!(line.abs() < 1e-9);
            assert!(signal.abs() < 1e-9);
            assert!(histogram.abs() < 1e-9);
        }
    }

    #[test]
    fn macd_zero_param_all_invalid() {
        let bars = make_bars(&[100.0, 101.0]);
        let series = calculate_macd(&bars, 0, 26, 9);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn macd_empty_bars() {
        let series = calculate_macd_default(&[]);
        assert!(series.values.is_empty());
    }

    #[test]
    fn macd_indicator_type() {
        let bars = make_bars(&[100.0]);
        let series = calculate_macd_default(&bars);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
        );
    }
}
