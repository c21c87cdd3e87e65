// Tick-to-bar aggregation and bar history
pub mod aggregator;
pub mod series;

pub use aggregator::{BarAggregator, Seeded};
pub use series::{BarSeries, OutOfOrderBar};
