use super::{closes, require_bars, Strategy};
use crate::error::StrategyError;
use crate::models::{Bar, Position, TargetSignal};

/// Bets against the recent move: the negated sign of the mean log return
/// over the last `window` bars.
///
/// With `window = 1` this is the default rule: fade the latest bar.
#[derive(Debug, Clone)]
pub struct ContrarianStrategy {
    window: usize,
}

impl ContrarianStrategy {
    pub fn new(window: usize) -> Result<Self, StrategyError> {
        if window == 0 {
            return Err(StrategyError::InvalidParameters(
                "contrarian window must be at least 1".into(),
            ));
        }
        Ok(Self { window })
    }
}

impl Default for ContrarianStrategy {
    fn default() -> Self {
        Self { window: 1 }
    }
}

impl Strategy for ContrarianStrategy {
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        require_bars(bars, self.min_lookback())?;

        let prices = closes(&bars[bars.len() - self.min_lookback()..]);
        let mean_return = prices
            .windows(2)
            .map(|w| (w[1] / w[0]).ln())
            .sum::<f64>()
            / self.window as f64;

        let signal = if mean_return > 0.0 {
            Position::Short
        } else if mean_return < 0.0 {
            Position::Long
        } else {
            Position::Flat
        };
        Ok(signal)
    }

    fn name(&self) -> &str {
        "Contrarian"
    }

    fn min_lookback(&self) -> usize {
        self.window + 1
    }
}
