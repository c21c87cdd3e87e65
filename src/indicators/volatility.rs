/// Rolling sample standard deviation (n - 1 denominator)
pub fn rolling_std(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(prices, window, |slice| {
        if slice.len() < 2 {
            return None;
        }
        let n = slice.len() as f64;
        let mean = slice.iter().sum::<f64>() / n;
        let variance = slice.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(variance.sqrt())
    })
}

pub fn rolling_max(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(prices, window, |slice| slice.iter().copied().reduce(f64::max))
}

pub fn rolling_min(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(prices, window, |slice| slice.iter().copied().reduce(f64::min))
}

fn rolling<F>(prices: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    (0..prices.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                f(&prices[i + 1 - window..=i])
            }
        })
        .collect()
}
