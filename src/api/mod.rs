// Broker-side collaborators: live prices, history and order routing
//
// The session only talks to these traits. `paper`, `quotes` and `synthetic`
// provide in-process implementations so the agent runs without a broker.
pub mod paper;
pub mod quotes;
pub mod synthetic;

pub use paper::PaperBroker;
pub use quotes::{Quote, QuoteBoard};
pub use synthetic::{SyntheticFeed, SyntheticHistory};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;

use crate::error::{FeedError, OrderSubmissionError};
use crate::models::{HistoricalRecord, Order, Tick};

/// Ticks of one subscription. The channel closing means the feed dropped.
pub type TickStream = mpsc::Receiver<Result<Tick, FeedError>>;

/// Live bid/ask stream.
///
/// Timestamps are non-decreasing within one subscription; nothing is
/// promised across subscriptions.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn subscribe(&self, instrument: &str) -> Result<TickStream, FeedError>;
}

/// Historical sub-bar records, used only while seeding
#[async_trait]
pub trait HistoricalData: Send + Sync {
    async fn fetch(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Duration,
    ) -> Result<Vec<HistoricalRecord>, FeedError>;
}

/// Market order routing. A failure never yields a partial fill.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, instrument: &str, units: i64) -> Result<Order, OrderSubmissionError>;
}
