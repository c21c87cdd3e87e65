use super::{closes, hold_last, require_bars, Strategy};
use crate::error::StrategyError;
use crate::indicators::{rolling_max, rolling_min};
use crate::models::{Bar, Position, TargetSignal};

/// Ichimoku cloud on closes: long above a rising cloud, short below a
/// falling one, hold otherwise.
#[derive(Debug, Clone)]
pub struct IchimokuStrategy {
    conversion: usize,
    base: usize,
    leading: usize,
}

fn midpoints(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_max(prices, window)
        .into_iter()
        .zip(rolling_min(prices, window))
        .map(|(hi, lo)| Some((hi? + lo?) / 2.0))
        .collect()
}

impl IchimokuStrategy {
    pub fn new(conversion: usize, base: usize, leading: usize) -> Result<Self, StrategyError> {
        if conversion == 0 || base == 0 || leading == 0 {
            return Err(StrategyError::InvalidParameters(format!(
                "ichimoku periods must be positive, got {conversion}/{base}/{leading}"
            )));
        }
        Ok(Self {
            conversion,
            base,
            leading,
        })
    }
}

impl Default for IchimokuStrategy {
    fn default() -> Self {
        Self {
            conversion: 9,
            base: 26,
            leading: 52,
        }
    }
}

impl Strategy for IchimokuStrategy {
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        require_bars(bars, self.min_lookback())?;

        let prices = closes(bars);
        let conversion = midpoints(&prices, self.conversion);
        let base = midpoints(&prices, self.base);
        let leading_long = midpoints(&prices, self.leading);

        let signals = prices.iter().enumerate().map(|(i, price)| {
            let (conv, base, span_b) = (conversion[i]?, base[i]?, leading_long[i]?);
            let span_a = (conv + base) / 2.0;
            if *price > span_a && span_a > span_b {
                Some(Position::Long)
            } else if *price < span_a && span_a < span_b {
                Some(Position::Short)
            } else {
                None
            }
        });

        Ok(hold_last(signals))
    }

    fn name(&self) -> &str {
        "Ichimoku"
    }

    fn min_lookback(&self) -> usize {
        self.conversion.max(self.base).max(self.leading)
    }
}
