use super::{closes, hold_last, require_bars, Strategy};
use crate::error::StrategyError;
use crate::indicators::rsi_series;
use crate::models::{Bar, Position, TargetSignal};

/// Momentum read of RSI: long above `buy_threshold`, short below
/// `short_threshold`, otherwise keep the previous call.
#[derive(Debug, Clone)]
pub struct RsiStrategy {
    window: usize,
    buy_threshold: f64,
    short_threshold: f64,
}

impl RsiStrategy {
    pub fn new(
        window: usize,
        buy_threshold: f64,
        short_threshold: f64,
    ) -> Result<Self, StrategyError> {
        if window == 0 {
            return Err(StrategyError::InvalidParameters(
                "rsi window must be at least 1".into(),
            ));
        }
        if !(0.0..=100.0).contains(&short_threshold)
            || !(0.0..=100.0).contains(&buy_threshold)
            || short_threshold >= buy_threshold
        {
            return Err(StrategyError::InvalidParameters(format!(
                "rsi thresholds must satisfy 0 <= short < buy <= 100, got short={short_threshold} buy={buy_threshold}"
            )));
        }
        Ok(Self {
            window,
            buy_threshold,
            short_threshold,
        })
    }
}

impl Default for RsiStrategy {
    fn default() -> Self {
        Self {
            window: 14,
            buy_threshold: 70.0,
            short_threshold: 30.0,
        }
    }
}

impl Strategy for RsiStrategy {
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        require_bars(bars, self.min_lookback())?;

        let rsi = rsi_series(&closes(bars), self.window);
        Ok(hold_last(rsi.into_iter().map(|value| match value {
            Some(v) if v > self.buy_threshold => Some(Position::Long),
            Some(v) if v < self.short_threshold => Some(Position::Short),
            _ => None,
        })))
    }

    fn name(&self) -> &str {
        "Rsi"
    }

    fn min_lookback(&self) -> usize {
        self.window + 1
    }
}
