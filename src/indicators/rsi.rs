/// Relative Strength Index from simple rolling averages of gains and losses
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// The first value is always `None` (no change yet). A window with neither
/// gains nor losses is `None`; one with only gains is 100.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return out;
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    for end in period..=changes.len() {
        let window = &changes[end - period..end];
        let avg_gain = window.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
        let avg_loss = -window.iter().filter(|c| **c < 0.0).sum::<f64>() / period as f64;

        out[end] = if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                None
            } else {
                Some(100.0)
            }
        } else {
            let rs = avg_gain / avg_loss;
            Some(100.0 - (100.0 / (1.0 + rs)))
        };
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_calculation() {
        let prices = vec![
            44.0, 44.25, 44.5, 43.75, 44.0, 44.5, 45.0, 45.5, 45.25, 45.5, 46.0, 46.5, 46.25,
            46.0, 46.5,
        ];

        let rsi = rsi_series(&prices, 14);
        assert_eq!(rsi.len(), prices.len());
        let value = rsi[14].unwrap();
        assert!(value > 0.0 && value < 100.0);
        assert!(rsi[13].is_none());
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let prices = vec![100.0, 102.0, 101.0];
        assert!(rsi_series(&prices, 14).iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_all_gains() {
        let prices = vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        let rsi = rsi_series(&prices, 5);
        assert_eq!(rsi[5], Some(100.0));
    }

    #[test]
    fn test_rsi_balanced() {
        let prices = vec![100.0, 102.0, 100.0, 102.0, 100.0];
        let rsi = rsi_series(&prices, 4);
        assert_eq!(rsi[4], Some(50.0));
    }

    #[test]
    fn test_rsi_flat_is_undefined() {
        let prices = vec![100.0; 6];
        assert!(rsi_series(&prices, 5)[5].is_none());
    }
}
