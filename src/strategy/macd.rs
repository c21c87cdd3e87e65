use super::{closes, require_bars, Strategy};
use crate::error::StrategyError;
use crate::indicators::ema_series;
use crate::models::{Bar, Position, TargetSignal};

/// Long while the MACD line is above its signal line, short otherwise
#[derive(Debug, Clone)]
pub struct MacdStrategy {
    short: usize,
    long: usize,
    signal: usize,
}

impl MacdStrategy {
    pub fn new(short: usize, long: usize, signal: usize) -> Result<Self, StrategyError> {
        if short == 0 || short >= long || signal == 0 {
            return Err(StrategyError::InvalidParameters(format!(
                "macd needs 0 < short < long and signal > 0, got {short}/{long}/{signal}"
            )));
        }
        Ok(Self {
            short,
            long,
            signal,
        })
    }

    /// MACD line and its signal line for every bar
    pub fn lines(&self, prices: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let fast = ema_series(prices, self.short);
        let slow = ema_series(prices, self.long);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_series(&macd, self.signal);
        (macd, signal)
    }
}

impl Default for MacdStrategy {
    fn default() -> Self {
        Self {
            short: 12,
            long: 26,
            signal: 9,
        }
    }
}

impl Strategy for MacdStrategy {
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        require_bars(bars, self.min_lookback())?;

        let (macd, signal) = self.lines(&closes(bars));
        match (macd.last(), signal.last()) {
            (Some(m), Some(s)) if m > s => Ok(Position::Long),
            (Some(_), Some(_)) => Ok(Position::Short),
            _ => Err(StrategyError::InsufficientData {
                have: bars.len(),
                need: self.min_lookback(),
            }),
        }
    }

    fn name(&self) -> &str {
        "Macd"
    }

    fn min_lookback(&self) -> usize {
        self.long + self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::bars_from_closes;

    #[test]
    fn test_accelerating_rally_is_long() {
        let strategy = MacdStrategy::new(3, 6, 3).unwrap();
        let prices: Vec<f64> = (0..30).map(|i| 1.0 + (i * i) as f64 * 0.001).collect();
        assert_eq!(
            strategy.evaluate(&bars_from_closes(&prices)).unwrap(),
            Position::Long
        );
    }

    #[test]
    fn test_rollover_is_short() {
        let strategy = MacdStrategy::new(3, 6, 3).unwrap();
        let mut prices: Vec<f64> = (0..20).map(|i| 1.0 + i as f64 * 0.01).collect();
        prices.extend((0..10).map(|i| 1.19 - i as f64 * 0.03));
        assert_eq!(
            strategy.evaluate(&bars_from_closes(&prices)).unwrap(),
            Position::Short
        );
    }

    #[test]
    fn test_lookback() {
        assert_eq!(MacdStrategy::default().min_lookback(), 35);
        assert!(MacdStrategy::new(26, 12, 9).is_err());
    }
}
