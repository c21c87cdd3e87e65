// Trading strategy module
pub mod bollinger;
pub mod contrarian;
pub mod crossover;
pub mod hours;
pub mod ichimoku;
pub mod macd;
pub mod rsi;

pub use bollinger::BollingerStrategy;
pub use contrarian::ContrarianStrategy;
pub use crossover::{EmaCrossoverStrategy, SmaCrossoverStrategy};
pub use hours::TradingHours;
pub use ichimoku::IchimokuStrategy;
pub use macd::MacdStrategy;
pub use rsi::RsiStrategy;

use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::error::StrategyError;
use crate::models::{Bar, Position, TargetSignal};

/// Signal rule evaluated on every closed bar.
///
/// Implementations must be pure: the same bars always give the same target.
pub trait Strategy: Send + Sync {
    /// Target position for the most recent bar in `bars`
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError>;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Minimum number of bars `evaluate` needs
    fn min_lookback(&self) -> usize;
}

/// Strategy selection as it appears in configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    Contrarian {
        window: usize,
    },
    SmaCrossover {
        short: usize,
        long: usize,
    },
    EmaCrossover {
        short: usize,
        long: usize,
    },
    Macd {
        short: usize,
        long: usize,
        signal: usize,
    },
    Rsi {
        window: usize,
        #[serde(default = "default_buy_threshold")]
        buy_threshold: f64,
        #[serde(default = "default_short_threshold")]
        short_threshold: f64,
    },
    Bollinger {
        window: usize,
        #[serde(default = "default_deviations")]
        dev: f64,
    },
    Ichimoku {
        conversion: usize,
        base: usize,
        leading: usize,
    },
}

fn default_buy_threshold() -> f64 {
    70.0
}

fn default_short_threshold() -> f64 {
    30.0
}

fn default_deviations() -> f64 {
    1.0
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::Contrarian { window: 1 }
    }
}

impl StrategyKind {
    pub fn build(&self) -> Result<Box<dyn Strategy>, StrategyError> {
        let strategy: Box<dyn Strategy> = match *self {
            StrategyKind::Contrarian { window } => Box::new(ContrarianStrategy::new(window)?),
            StrategyKind::SmaCrossover { short, long } => {
                Box::new(SmaCrossoverStrategy::new(short, long)?)
            }
            StrategyKind::EmaCrossover { short, long } => {
                Box::new(EmaCrossoverStrategy::new(short, long)?)
            }
            StrategyKind::Macd {
                short,
                long,
                signal,
            } => Box::new(MacdStrategy::new(short, long, signal)?),
            StrategyKind::Rsi {
                window,
                buy_threshold,
                short_threshold,
            } => Box::new(RsiStrategy::new(window, buy_threshold, short_threshold)?),
            StrategyKind::Bollinger { window, dev } => {
                Box::new(BollingerStrategy::new(window, dev)?)
            }
            StrategyKind::Ichimoku {
                conversion,
                base,
                leading,
            } => Box::new(IchimokuStrategy::new(conversion, base, leading)?),
        };
        Ok(strategy)
    }
}

/// Fail with `InsufficientData` when fewer than `need` bars are present
pub(crate) fn require_bars(bars: &[Bar], need: usize) -> Result<(), StrategyError> {
    if bars.len() < need {
        return Err(StrategyError::InsufficientData {
            have: bars.len(),
            need,
        });
    }
    Ok(())
}

/// Closing prices as floats for indicator math
pub(crate) fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .map(|b| b.close.to_f64().unwrap_or(f64::NAN))
        .collect()
}

/// Hold the last decisive signal; FLAT until the first one appears
pub(crate) fn hold_last<I>(signals: I) -> Position
where
    I: IntoIterator<Item = Option<Position>>,
{
    signals
        .into_iter()
        .flatten()
        .last()
        .unwrap_or(Position::Flat)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::Bar;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;

    /// One-minute bars closing at the given prices
    pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let price = Decimal::from_f64(*close).unwrap();
                Bar::flat(
                    base + Duration::minutes(i as i64),
                    base + Duration::minutes(i as i64 + 1),
                    price,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kind_is_contrarian() {
        let strategy = StrategyKind::default().build().unwrap();
        assert_eq!(strategy.name(), "Contrarian");
        assert_eq!(strategy.min_lookback(), 2);
    }

    #[test]
    fn test_build_every_kind() {
        let kinds = vec![
            StrategyKind::Contrarian { window: 3 },
            StrategyKind::SmaCrossover { short: 50, long: 200 },
            StrategyKind::EmaCrossover { short: 20, long: 50 },
            StrategyKind::Macd {
                short: 12,
                long: 26,
                signal: 9,
            },
            StrategyKind::Rsi {
                window: 14,
                buy_threshold: 70.0,
                short_threshold: 30.0,
            },
            StrategyKind::Bollinger { window: 5, dev: 1.0 },
            StrategyKind::Ichimoku {
                conversion: 9,
                base: 26,
                leading: 52,
            },
        ];
        for kind in kinds {
            assert!(kind.build().is_ok(), "{kind:?} should build");
        }
    }

    #[test]
    fn test_build_rejects_bad_parameters() {
        assert!(StrategyKind::SmaCrossover { short: 50, long: 20 }.build().is_err());
        assert!(StrategyKind::Contrarian { window: 0 }.build().is_err());
        assert!(StrategyKind::Rsi {
            window: 14,
            buy_threshold: 20.0,
            short_threshold: 30.0
        }
        .build()
        .is_err());
    }

    #[test]
    fn test_hold_last() {
        assert_eq!(hold_last(vec![None, None]), Position::Flat);
        assert_eq!(
            hold_last(vec![Some(Position::Long), None, None]),
            Position::Long
        );
        assert_eq!(
            hold_last(vec![Some(Position::Long), Some(Position::Flat), None]),
            Position::Flat
        );
    }
}
