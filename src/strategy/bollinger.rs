use super::{closes, hold_last, require_bars, Strategy};
use crate::error::StrategyError;
use crate::indicators::{rolling_std, sma_series};
use crate::models::{Bar, Position, TargetSignal};

/// Mean reversion on Bollinger bands.
///
/// Short above the upper band, long below the lower band, flat when price
/// crosses the middle band; otherwise hold.
#[derive(Debug, Clone)]
pub struct BollingerStrategy {
    window: usize,
    dev: f64,
}

impl BollingerStrategy {
    pub fn new(window: usize, dev: f64) -> Result<Self, StrategyError> {
        if window < 2 || dev <= 0.0 {
            return Err(StrategyError::InvalidParameters(format!(
                "bollinger needs window >= 2 and dev > 0, got window={window} dev={dev}"
            )));
        }
        Ok(Self { window, dev })
    }
}

impl Strategy for BollingerStrategy {
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        require_bars(bars, self.min_lookback())?;

        let prices = closes(bars);
        let middle = sma_series(&prices, self.window);
        let std = rolling_std(&prices, self.window);

        let mut previous_distance: Option<f64> = None;
        let signals = prices.iter().enumerate().map(|(i, price)| {
            let (mid, sd) = match (middle[i], std[i]) {
                (Some(mid), Some(sd)) => (mid, sd),
                _ => return None,
            };
            let distance = price - mid;
            let crossed = previous_distance.is_some_and(|prev| prev * distance < 0.0);
            previous_distance = Some(distance);

            if crossed {
                Some(Position::Flat)
            } else if *price < mid - self.dev * sd {
                Some(Position::Long)
            } else if *price > mid + self.dev * sd {
                Some(Position::Short)
            } else {
                None
            }
        });

        Ok(hold_last(signals))
    }

    fn name(&self) -> &str {
        "Bollinger"
    }

    fn min_lookback(&self) -> usize {
        self.window
    }
}
