use super::{closes, require_bars, Strategy};
use crate::error::StrategyError;
use crate::indicators::{ema_series, sma_series};
use crate::models::{Bar, Position, TargetSignal};

fn validate_periods(short: usize, long: usize) -> Result<(), StrategyError> {
    if short == 0 || short >= long {
        return Err(StrategyError::InvalidParameters(format!(
            "crossover needs 0 < short < long, got short={short} long={long}"
        )));
    }
    Ok(())
}

fn side(fast: f64, slow: f64) -> Position {
    if fast > slow {
        Position::Long
    } else {
        Position::Short
    }
}

/// Long while the short SMA is above the long SMA, short otherwise
#[derive(Debug, Clone)]
pub struct SmaCrossoverStrategy {
    short: usize,
    long: usize,
}

impl SmaCrossoverStrategy {
    pub fn new(short: usize, long: usize) -> Result<Self, StrategyError> {
        validate_periods(short, long)?;
        Ok(Self { short, long })
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        require_bars(bars, self.min_lookback())?;
        let prices = closes(bars);

        let fast = sma_series(&prices, self.short);
        let slow = sma_series(&prices, self.long);
        match (fast.last().copied().flatten(), slow.last().copied().flatten()) {
            (Some(fast), Some(slow)) => Ok(side(fast, slow)),
            _ => Err(StrategyError::InsufficientData {
                have: bars.len(),
                need: self.long,
            }),
        }
    }

    fn name(&self) -> &str {
        "SmaCrossover"
    }

    fn min_lookback(&self) -> usize {
        self.long
    }
}

/// Long while the short EMA is above the long EMA, short otherwise
#[derive(Debug, Clone)]
pub struct EmaCrossoverStrategy {
    short: usize,
    long: usize,
}

impl EmaCrossoverStrategy {
    pub fn new(short: usize, long: usize) -> Result<Self, StrategyError> {
        validate_periods(short, long)?;
        Ok(Self { short, long })
    }
}

impl Strategy for EmaCrossoverStrategy {
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        require_bars(bars, self.min_lookback())?;
        let prices = closes(bars);

        let fast = ema_series(&prices, self.short);
        let slow = ema_series(&prices, self.long);
        match (fast.last(), slow.last()) {
            (Some(fast), Some(slow)) => Ok(side(*fast, *slow)),
            _ => Err(StrategyError::InsufficientData {
                have: bars.len(),
                need: self.long,
            }),
        }
    }

    fn name(&self) -> &str {
        "EmaCrossover"
    }

    fn min_lookback(&self) -> usize {
        self.long
    }
}
