/// Simple Moving Average over a trailing window
pub fn sma_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; prices.len()];
    }

    let mut out = Vec::with_capacity(prices.len());
    let mut sum = 0.0;
    for (i, price) in prices.iter().enumerate() {
        sum += price;
        if i >= period {
            sum -= prices[i - period];
        }
        out.push(if i + 1 >= period {
            Some(sum / period as f64)
        } else {
            None
        });
    }
    out
}

/// Exponential Moving Average with span smoothing, seeded with the first price
///
/// alpha = 2 / (span + 1); every position has a value.
pub fn ema_series(prices: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);

    let mut out = Vec::with_capacity(prices.len());
    let mut ema = match prices.first() {
        Some(first) => *first,
        None => return out,
    };
    for price in prices {
        ema = (price - ema) * alpha + ema;
        out.push(ema);
    }
    out
}
