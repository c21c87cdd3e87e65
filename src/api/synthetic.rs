use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use super::{HistoricalData, PriceFeed, QuoteBoard, TickStream};
use crate::error::FeedError;
use crate::models::{HistoricalRecord, Tick};

const CHANNEL_CAPACITY: usize = 1024;
const PRICE_DECIMALS: u32 = 5;

fn to_price(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(PRICE_DECIMALS))
}

fn quote_tick(timestamp: DateTime<Utc>, mid: f64, half_spread: f64) -> Option<Tick> {
    Some(Tick::new(
        timestamp,
        to_price(mid - half_spread)?,
        to_price(mid + half_spread)?,
    ))
}

/// Random-walk tick generator for paper trading
///
/// Each subscription spawns a task that emits one tick per `tick_interval`
/// and publishes it to the shared `QuoteBoard`. The walk resumes from the
/// board's latest quote so a reconnect does not jump.
pub struct SyntheticFeed {
    quotes: QuoteBoard,
    seed: u64,
    subscriptions: AtomicU64,
    start_price: f64,
    half_spread: f64,
    volatility: f64,
    tick_interval: std::time::Duration,
}

impl SyntheticFeed {
    /// Create a new feed with a seed for reproducibility
    pub fn new(quotes: QuoteBoard, seed: u64) -> Self {
        Self {
            quotes,
            seed,
            subscriptions: AtomicU64::new(0),
            start_price: 1.1,
            half_spread: 0.00005,
            volatility: 0.0001,
            tick_interval: std::time::Duration::from_millis(250),
        }
    }

    pub fn with_start_price(mut self, price: f64) -> Self {
        self.start_price = price;
        self
    }

    pub fn with_tick_interval(mut self, interval: std::time::Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

#[async_trait]
impl PriceFeed for SyntheticFeed {
    async fn subscribe(&self, instrument: &str) -> Result<TickStream, FeedError> {
        let subscription = self.subscriptions.fetch_add(1, Ordering::Relaxed);
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(subscription));

        let mut price = match self.quotes.latest(instrument) {
            Some(quote) => ((quote.bid + quote.ask) / Decimal::TWO)
                .to_f64()
                .unwrap_or(self.start_price),
            None => self.start_price,
        };

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let quotes = self.quotes.clone();
        let instrument = instrument.to_string();
        let (half_spread, volatility, tick_interval) =
            (self.half_spread, self.volatility, self.tick_interval);

        tracing::info!(instrument = %instrument, subscription, "📡 Synthetic feed subscribed");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            loop {
                interval.tick().await;
                price *= 1.0 + rng.gen_range(-volatility..volatility);

                let Some(tick) = quote_tick(Utc::now(), price, half_spread) else {
                    continue;
                };
                quotes.publish(&instrument, &tick);

                // Subscriber went away
                if tx.send(Ok(tick)).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}

/// Seeded random-walk history at the requested granularity
pub struct SyntheticHistory {
    seed: u64,
    start_price: f64,
    volatility: f64,
}

impl SyntheticHistory {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            start_price: 1.1,
            volatility: 0.0002,
        }
    }

    pub fn with_start_price(mut self, price: f64) -> Self {
        self.start_price = price;
        self
    }

    /// Records covering `[start, end)`, one per `granularity`
    pub fn generate(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Duration,
    ) -> Vec<HistoricalRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut price = self.start_price;
        let mut records = Vec::new();

        let mut timestamp = start;
        while timestamp < end {
            price *= 1.0 + rng.gen_range(-self.volatility..self.volatility);
            if let Some(close) = to_price(price) {
                records.push(HistoricalRecord { timestamp, close });
            }
            timestamp += granularity;
        }
        records
    }
}

#[async_trait]
impl HistoricalData for SyntheticHistory {
    async fn fetch(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Duration,
    ) -> Result<Vec<HistoricalRecord>, FeedError> {
        if granularity <= Duration::zero() {
            return Err(FeedError::Fetch(format!(
                "granularity must be positive, got {granularity}"
            )));
        }

        let records = self.generate(start, end, granularity);
        tracing::debug!(
            instrument = %instrument,
            records = records.len(),
            "Generated synthetic history"
        );
        Ok(records)
    }
}
