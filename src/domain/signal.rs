//! Signal events and the polymorphic signal generator.
//!
//! Every strategy variant reduces to two crossing conditions per bar:
//! a buy condition and a sell condition, each a strict transition between
//! bar i-1 and bar i (never a level test). Crossings require both sides
//! defined at i and i-1; a warmup point on either side suppresses the
//! signal at i. Index 0 never fires.
//!
//! The generator gates candidates through a local flat/holding flag seeded
//! flat: Buy only while flat, Sell only while holding. When both
//! conditions hold at one index, Sell wins while holding, otherwise the
//! Buy is considered. At most one event per date by construction.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub date: NaiveDate,
    pub kind: SignalKind,
}

/// Generate the ordered buy/sell event sequence for `strategy` over `bars`.
///
/// `indicators` must contain the series `strategy.required_indicators()`
/// names; a missing or all-warmup series simply produces no events.
pub fn generate(
    strategy: &StrategyKind,
    bars: &[OhlcvBar],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
) -> Vec<SignalEvent> {
    let n = bars.len();
    if n < 2 {
        return Vec::new();
    }

    let (buy, sell) = match *strategy {
        StrategyKind::SmaCross { fast, slow } => {
            let a = simple_values(indicators.get(&IndicatorType::Sma(fast)), n);
            let b = simple_values(indicators.get(&IndicatorType::Sma(slow)), n);
            (cross_above(&a, &b), cross_below(&a, &b))
        }
        StrategyKind::EmaCross { fast, slow } => {
            let a = simple_values(indicators.get(&IndicatorType::Ema(fast)), n);
            let b = simple_values(indicators.get(&IndicatorType::Ema(slow)), n);
            (cross_above(&a, &b), cross_below(&a, &b))
        }
        StrategyKind::MacdCross { fast, slow, signal } => {
            let series = indicators.get(&IndicatorType::Macd { fast, slow, signal });
            let line = macd_values(series, n, |line, _| line);
            let signal_line = macd_values(series, n, |_, signal| signal);
            (
                cross_above(&line, &signal_line),
                cross_below(&line, &signal_line),
            )
        }
        StrategyKind::RsiReversion {
            period,
            lower,
            upper,
        } => {
            let rsi = simple_values(indicators.get(&IndicatorType::Rsi(period)), n);
            let lower = vec![Some(lower); n];
            let upper = vec![Some(upper); n];
            (cross_below(&rsi, &lower), cross_above(&rsi, &upper))
        }
        StrategyKind::BollingerReversion {
            period,
            stddev_mult_x100,
        } => {
            let series = indicators.get(&IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            });
            let close: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
            let lower_band = band_values(series, n, |_, lower| lower);
            let upper_band = band_values(series, n, |upper, _| upper);
            (
                cross_below(&close, &lower_band),
                cross_above(&close, &upper_band),
            )
        }
    };

    gate(bars, &buy, &sell)
}

/// True at i where a[i] > b[i] and a[i-1] <= b[i-1], all four defined.
fn cross_above(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    let mut marks = vec![false; a.len()];
    for i in 1..a.len() {
        if let (Some(ac), Some(bc), Some(ap), Some(bp)) = (a[i], b[i], a[i - 1], b[i - 1]) {
            marks[i] = ac > bc && ap <= bp;
        }
    }
    marks
}

/// True at i where a[i] < b[i] and a[i-1] >= b[i-1], all four defined.
fn cross_below(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    let mut marks = vec![false; a.len()];
    for i in 1..a.len() {
        if let (Some(ac), Some(bc), Some(ap), Some(bp)) = (a[i], b[i], a[i - 1], b[i - 1]) {
            marks[i] = ac < bc && ap >= bp;
        }
    }
    marks
}

fn gate(bars: &[OhlcvBar], buy: &[bool], sell: &[bool]) -> Vec<SignalEvent> {
    let mut events = Vec::new();
    let mut holding = false;

    for (i, bar) in bars.iter().enumerate() {
        if holding {
            if sell[i] {
                events.push(SignalEvent {
                    date: bar.date,
                    kind: SignalKind::Sell,
                });
                holding = false;
            }
        } else if buy[i] {
            events.push(SignalEvent {
                date: bar.date,
                kind: SignalKind::Buy,
            });
            holding = true;
        }
    }

    events
}

fn simple_values(series: Option<&IndicatorSeries>, n: usize) -> Vec<Option<f64>> {
    let Some(series) = series else {
        return vec![None; n];
    };
    (0..n).map(|i| series.simple_at(i)).collect()
}

fn macd_values(
    series: Option<&IndicatorSeries>,
    n: usize,
    pick: fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    let Some(series) = series else {
        return vec![None; n];
    };
    (0..n)
        .map(|i| {
            let point = series.values.get(i)?;
            if !point.valid {
                return None;
            }
            match point.value {
                IndicatorValue::Macd { line, signal, .. } => Some(pick(line, signal)),
                _ => None,
            }
        })
        .collect()
}

fn band_values(
    series: Option<&IndicatorSeries>,
    n: usize,
    pick: fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    let Some(series) = series else {
        return vec![None; n];
    };
    (0..n)
        .map(|i| {
            let point = series.values.get(i)?;
            if !point.valid {
                return None;
            }
            match point.value {
                IndicatorValue::Bollinger { upper, lower, .. } => Some(pick(upper, lower)),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::compute_indicators;
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

    /// Manufacture a Simple series, invalid wherever a value is None.
    fn simple_series(indicator_type: IndicatorType, values: &[Option<f64>]) -> IndicatorSeries {
        IndicatorSeries {
            indicator_type,
            values: values
                .iter()
                .enumerate()
                .map(|(i, v)| crate::domain::indicator::IndicatorPoint {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64),
                    valid: v.is_some(),
                    value: IndicatorValue::Simple(v.unwrap_or(0.0)),
                })
                .collect(),
        }
    }

    fn rsi_strategy(
        values: &[Option<f64>],
    ) -> (
        StrategyKind,
        Vec<OhlcvBar>,
        HashMap<IndicatorType, IndicatorSeries>,
    ) {
        let strategy = StrategyKind::RsiReversion {
            period: 14,
            lower: 30.0,
            upper: 70.0,
        };
        let bars = make_bars(&vec![100.0; values.len()]);
        let mut indicators = HashMap::new();
        indicators.insert(
            IndicatorType::Rsi(14),
            simple_series(IndicatorType::Rsi(14), values),
        );
        (strategy, bars, indicators)
    }

    #[test]
    fn threshold_fires_on_strict_crossing_only() {
        // dips below 30 at index 1, stays in the zone at 2, recovers,
        // crosses above 70 at index 4, stays above at 5
        let values: Vec<Option<f64>> = [50.0, 25.0, 22.0, 40.0, 75.0, 80.0, 60.0]
            .iter()
            .map(|&v| Some(v))
            .collect();
        let (strategy, bars, indicators) = rsi_strategy(&values);

        let events = generate(&strategy, &bars, &indicators);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SignalKind::Buy);
        assert_eq!(events[0].date, bars[1].date);
        assert_eq!(events[1].kind, SignalKind::Sell);
        assert_eq!(events[1].date, bars[4].date);
    }

    #[test]
    fn threshold_in_zone_does_not_refire() {
        // below the lower threshold for many bars: exactly one Buy
        let values: Vec<Option<f64>> = [50.0, 25.0, 20.0, 15.0, 25.0, 28.0]
            .iter()
            .map(|&v| Some(v))
            .collect();
        let (strategy, bars, indicators) = rsi_strategy(&values);

        let events = generate(&strategy, &bars, &indicators);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, SignalKind::Buy);
    }

    #[test]
    fn threshold_gating_blocks_second_buy() {
        // two downward crossings with no sell in between: one Buy
        let values: Vec<Option<f64>> = [50.0, 25.0, 40.0, 25.0, 40.0]
            .iter()
            .map(|&v| Some(v))
            .collect();
        let (strategy, bars, indicators) = rsi_strategy(&values);

        let events = generate(&strategy, &bars, &indicators);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, SignalKind::Buy);
    }

    #[test]
    fn sell_without_position_is_never_emitted() {
        // crosses above 70 while flat: nothing
        let values: Vec<Option<f64>> = [50.0, 75.0, 60.0].iter().map(|&v| Some(v)).collect();
        let (strategy, bars, indicators) = rsi_strategy(&values);

        let events = generate(&strategy, &bars, &indicators);
        assert!(events.is_empty());
    }

    #[test]
    fn undefined_point_suppresses_signal() {
        // the crossing at index 2 has an undefined previous point
        let values: Vec<Option<f64>> = vec![Some(50.0), None, Some(25.0), Some(20.0)];
        let (strategy, bars, indicators) = rsi_strategy(&values);

        let events = generate(&strategy, &bars, &indicators);
        assert!(events.is_empty());
    }

    #[test]
    fn crossover_requires_transition() {
        // fast stays above slow the whole time: zero events
        let fast: Vec<Option<f64>> = [10.0, 11.0, 12.0, 13.0].iter().map(|&v| Some(v)).collect();
        let slow: Vec<Option<f64>> = [5.0, 6.0, 7.0, 8.0].iter().map(|&v| Some(v)).collect();

        let strategy = StrategyKind::SmaCross { fast: 2, slow: 3 };
        let bars = make_bars(&[100.0; 4]);
        let mut indicators = HashMap::new();
        indicators.insert(
            IndicatorType::Sma(2),
            simple_series(IndicatorType::Sma(2), &fast),
        );
        indicators.insert(
            IndicatorType::Sma(3),
            simple_series(IndicatorType::Sma(3), &slow),
        );

        let events = generate(&strategy, &bars, &indicators);
        assert!(events.is_empty());
    }

    #[test]
    fn crossover_buy_then_sell() {
        let fast: Vec<Option<f64>> = [5.0, 11.0, 12.0, 6.0].iter().map(|&v| Some(v)).collect();
        let slow: Vec<Option<f64>> = [10.0, 10.0, 10.0, 10.0].iter().map(|&v| Some(v)).collect();

        let strategy = StrategyKind::SmaCross { fast: 2, slow: 3 };
        let bars = make_bars(&[100.0; 4]);
        let mut indicators = HashMap::new();
        indicators.insert(
            IndicatorType::Sma(2),
            simple_series(IndicatorType::Sma(2), &fast),
        );
        indicators.insert(
            IndicatorType::Sma(3),
            simple_series(IndicatorType::Sma(3), &slow),
        );

        let events = generate(&strategy, &bars, &indicators);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SignalKind::Buy);
        assert_eq!(events[0].date, bars[1].date);
        assert_eq!(events[1].kind, SignalKind::Sell);
        assert_eq!(events[1].date, bars[3].date);
    }

    #[test]
    fn tie_break_sell_wins_while_holding() {
        // buy and sell both marked at index 2 while holding from index 1
        let bars = make_bars(&[100.0; 3]);
        let buy = vec![false, true, true];
        let sell = vec![false, false, true];

        let events = gate(&bars, &buy, &sell);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SignalKind::Buy);
        assert_eq!(events[1].kind, SignalKind::Sell);
        assert_eq!(events[1].date, bars[2].date);
    }

    #[test]
    fn tie_break_buy_considered_while_flat() {
        let bars = make_bars(&[100.0; 2]);
        let buy = vec![false, true];
        let sell = vec![false, true];

        let events = gate(&bars, &buy, &sell);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, SignalKind::Buy);
    }

    #[test]
    fn band_reversion_end_to_end() {
        // flat around 100 to build the band, spike down through the lower
        // band at index 6, recover, spike up through the upper band at 11
        let mut prices = vec![100.0, 100.0, 100.0, 100.5, 99.5, 100.0];
        prices.extend([70.0, 100.0, 100.5, 99.5, 100.0, 120.0, 100.0]);
        let bars = make_bars(&prices);

        let strategy = StrategyKind::BollingerReversion {
            period: 5,
            stddev_mult_x100: 150,
        };
        let indicators = compute_indicators(&bars, &strategy.required_indicators());

        let events = generate(&strategy, &bars, &indicators);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SignalKind::Buy);
        assert_eq!(events[0].date, bars[6].date);
        assert_eq!(events[1].kind, SignalKind::Sell);
        assert_eq!(events[1].date, bars[11].date);
    }

    #[test]
    fn short_series_produces_no_events() {
        let strategy = StrategyKind::SmaCross { fast: 2, slow: 3 };
        let bars = make_bars(&[100.0]);
        let indicators = compute_indicators(&bars, &strategy.required_indicators());
        assert!(generate(&strategy, &bars, &indicators).is_empty());
    }

    #[test]
    fn missing_indicator_series_produces_no_events() {
        let strategy = StrategyKind::SmaCross { fast: 2, slow: 3 };
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let indicators = HashMap::new();
        assert!(generate(&strategy, &bars, &indicators).is_empty());
    }
}
