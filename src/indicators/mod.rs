// Rolling-window indicator series
// Each function returns one value per input price, `None` until the window fills

pub mod moving_average;
pub mod rsi;
pub mod volatility;

pub use moving_average::{ema_series, sma_series};
pub use rsi::rsi_series;
pub use volatility::{rolling_max, rolling_min, rolling_std};
