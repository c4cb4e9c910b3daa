//! Strategy catalog: named variants, parameters, required indicators.
//!
//! Every strategy is one of three structural shapes: two series crossing
//! each other (crossover), one series crossing fixed thresholds
//! (threshold), or the close crossing a dynamic channel (band). The
//! catalog fixes the shapes and their parameter names; parameters come
//! from the `[strategy]` config section with conventional defaults.

use crate::domain::error::TradesimError;
use crate::domain::indicator::{macd, IndicatorType};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_RSI_LOWER: f64 = 30.0;
pub const DEFAULT_RSI_UPPER: f64 = 70.0;
pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_MULT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    SmaCross {
        fast: usize,
        slow: usize,
    },
    EmaCross {
        fast: usize,
        slow: usize,
    },
    MacdCross {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    RsiReversion {
        period: usize,
        lower: f64,
        upper: f64,
    },
    BollingerReversion {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl StrategyKind {
    /// Catalog names accepted in `[strategy] name`.
    pub const NAMES: [&'static str; 5] = ["sma-cross", "ema-cross", "macd", "rsi", "bollinger"];

    /// Build the named strategy, reading its parameters from `config`.
    ///
    /// An unknown name is a configuration error, never a silent default.
    pub fn from_name(name: &str, config: &dyn ConfigPort) -> Result<Self, TradesimError> {
        match name.to_lowercase().as_str() {
            "sma-cross" => {
                let fast = read_period(config, "fast", 50)?;
                let slow = read_period(config, "slow", 200)?;
                check_fast_slow(fast, slow)?;
                Ok(StrategyKind::SmaCross { fast, slow })
            }
            "ema-cross" => {
                let fast = read_period(config, "fast", macd::DEFAULT_FAST as i64)?;
                let slow = read_period(config, "slow", macd::DEFAULT_SLOW as i64)?;
                check_fast_slow(fast, slow)?;
                Ok(StrategyKind::EmaCross { fast, slow })
            }
            "macd" => {
                let fast = read_period(config, "fast", macd::DEFAULT_FAST as i64)?;
                let slow = read_period(config, "slow", macd::DEFAULT_SLOW as i64)?;
                let signal = read_period(config, "signal", macd::DEFAULT_SIGNAL as i64)?;
                check_fast_slow(fast, slow)?;
                Ok(StrategyKind::MacdCross { fast, slow, signal })
            }
            "rsi" => {
                let period = read_period(config, "period", DEFAULT_RSI_PERIOD as i64)?;
                let lower = config.get_double("strategy", "lower", DEFAULT_RSI_LOWER);
                let upper = config.get_double("strategy", "upper", DEFAULT_RSI_UPPER);
                if !(0.0..=100.0).contains(&lower) || !(0.0..=100.0).contains(&upper) {
                    return Err(config_invalid(
                        "lower",
                        "thresholds must be between 0 and 100",
                    ));
                }
                if lower >= upper {
                    return Err(config_invalid("lower", "lower must be below upper"));
                }
                Ok(StrategyKind::RsiReversion {
                    period,
                    lower,
                    upper,
                })
            }
            "bollinger" => {
                let period = read_period(config, "period", DEFAULT_BOLLINGER_PERIOD as i64)?;
                if period < 2 {
                    return Err(config_invalid("period", "period must be at least 2"));
                }
                let mult = config.get_double("strategy", "band_mult", DEFAULT_BOLLINGER_MULT);
                if mult <= 0.0 {
                    return Err(config_invalid("band_mult", "band_mult must be positive"));
                }
                Ok(StrategyKind::BollingerReversion {
                    period,
                    stddev_mult_x100: (mult * 100.0).round() as u32,
                })
            }
            other => Err(config_invalid(
                "name",
                &format!(
                    "unknown strategy '{}' (known: {})",
                    other,
                    Self::NAMES.join(", ")
                ),
            )),
        }
    }

    /// Build from `[strategy] name` in the config.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradesimError> {
        let name =
            config
                .get_string("strategy", "name")
                .ok_or_else(|| TradesimError::ConfigMissing {
                    section: "strategy".into(),
                    key: "name".into(),
                })?;
        Self::from_name(name.trim(), config)
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::SmaCross { .. } => "sma-cross",
            StrategyKind::EmaCross { .. } => "ema-cross",
            StrategyKind::MacdCross { .. } => "macd",
            StrategyKind::RsiReversion { .. } => "rsi",
            StrategyKind::BollingerReversion { .. } => "bollinger",
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            StrategyKind::SmaCross { fast, slow } => format!("SMA crossover ({}/{})", fast, slow),
            StrategyKind::EmaCross { fast, slow } => format!("EMA crossover ({}/{})", fast, slow),
            StrategyKind::MacdCross { fast, slow, signal } => {
                format!("MACD crossover ({},{},{})", fast, slow, signal)
            }
            StrategyKind::RsiReversion {
                period,
                lower,
                upper,
            } => format!("RSI mean reversion ({}, {}/{})", period, lower, upper),
            StrategyKind::BollingerReversion {
                period,
                stddev_mult_x100,
            } => format!(
                "Bollinger band reversion ({}, {} stddev)",
                period,
                stddev_mult_x100 as f64 / 100.0
            ),
        }
    }

    /// The indicator series the signal generator needs for this variant.
    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        match *self {
            StrategyKind::SmaCross { fast, slow } => {
                vec![IndicatorType::Sma(fast), IndicatorType::Sma(slow)]
            }
            StrategyKind::EmaCross { fast, slow } => {
                vec![IndicatorType::Ema(fast), IndicatorType::Ema(slow)]
            }
            StrategyKind::MacdCross { fast, slow, signal } => {
                vec![IndicatorType::Macd { fast, slow, signal }]
            }
            StrategyKind::RsiReversion { period, .. } => vec![IndicatorType::Rsi(period)],
            StrategyKind::BollingerReversion {
                period,
                stddev_mult_x100,
            } => vec![IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            }],
        }
    }

    /// Minimum series length before any signal can possibly fire.
    ///
    /// A crossing needs both sides defined at i-1 and i, so this is the
    /// longest warmup plus two.
    pub fn min_bars(&self) -> usize {
        match *self {
            // SMA(slow) defined from index slow-1; earliest crossing at slow
            StrategyKind::SmaCross { slow, .. } => slow + 1,
            // first-close-seeded EMAs are defined from index 0
            StrategyKind::EmaCross { .. } | StrategyKind::MacdCross { .. } => 2,
            // RSI defined from index period
            StrategyKind::RsiReversion { period, .. } => period + 2,
            // bands defined from index period-1
            StrategyKind::BollingerReversion { period, .. } => period + 1,
        }
    }
}

fn read_period(config: &dyn ConfigPort, key: &str, default: i64) -> Result<usize, TradesimError> {
    let value = config.get_int("strategy", key, default);
    if value < 1 {
        return Err(config_invalid(key, &format!("{} must be at least 1", key)));
    }
    Ok(value as usize)
}

fn check_fast_slow(fast: usize, slow: usize) -> Result<(), TradesimError> {
    if fast >= slow {
        return Err(config_invalid("fast", "fast window must be below slow"));
    }
    Ok(())
}

fn config_invalid(key: &str, reason: &str) -> TradesimError {
    TradesimError::ConfigInvalid {
        section: "strategy".into(),
        key: key.into(),
        reason: reason.into(),
    }
}
