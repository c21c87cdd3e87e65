// Scripted collaborators shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fxtrader::api::{HistoricalData, OrderSubmitter, PriceFeed, TickStream};
use fxtrader::error::{FeedError, OrderSubmissionError, StrategyError};
use fxtrader::models::{Bar, HistoricalRecord, Order, Position, TargetSignal, Tick};
use fxtrader::Strategy;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

/// 2024-01-02 (a Tuesday, New York on EST) at the given UTC time
pub fn utc(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, hour, min, sec).unwrap()
}

pub fn price(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Tick whose mid is exactly `mid`
pub fn tick(at: DateTime<Utc>, mid: &str) -> Tick {
    let mid = price(mid);
    let half_spread = Decimal::new(1, 4);
    Tick::new(at, mid - half_spread, mid + half_spread)
}

/// Flat history every 5 seconds over `[from, to)`
pub fn history(from: DateTime<Utc>, to: DateTime<Utc>, close: &str) -> Vec<HistoricalRecord> {
    let close = price(close);
    let mut records = Vec::new();
    let mut at = from;
    while at < to {
        records.push(HistoricalRecord {
            timestamp: at,
            close,
        });
        at += Duration::seconds(5);
    }
    records
}

pub enum Subscription {
    /// `subscribe` fails with a connection error
    Refuse,
    /// Deliver the events, then drop the connection
    Stream(Vec<Result<Tick, FeedError>>),
    /// Deliver the events and keep the connection open
    StreamOpen(Vec<Result<Tick, FeedError>>),
}

/// Feed that plays one script per subscription, refusing once scripts run out
pub struct ScriptedFeed {
    scripts: Mutex<VecDeque<Subscription>>,
    open: Mutex<Vec<mpsc::Sender<Result<Tick, FeedError>>>>,
    subscribes: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new(scripts: Vec<Subscription>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            open: Mutex::new(Vec::new()),
            subscribes: AtomicUsize::new(0),
        }
    }

    /// One subscription delivering `ticks`, then disconnecting
    pub fn ticks(ticks: Vec<Tick>) -> Self {
        Self::new(vec![Subscription::Stream(ticks.into_iter().map(Ok).collect())])
    }

    pub fn subscribes(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn subscribe(&self, _instrument: &str) -> Result<TickStream, FeedError> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Subscription::Refuse);

        let (events, keep_open) = match script {
            Subscription::Refuse => return Err(FeedError::Connection("refused".into())),
            Subscription::Stream(events) => (events, false),
            Subscription::StreamOpen(events) => (events, true),
        };

        let (tx, rx) = mpsc::channel(events.len() + 1);
        for event in events {
            tx.try_send(event).unwrap();
        }
        if keep_open {
            self.open.lock().unwrap().push(tx);
        }
        Ok(rx)
    }
}

/// History that answers each fetch with the next response, repeating the last.
/// Queued failures are returned first.
pub struct ScriptedHistory {
    failures: Mutex<VecDeque<FeedError>>,
    responses: Mutex<VecDeque<Vec<HistoricalRecord>>>,
    last: Mutex<Vec<HistoricalRecord>>,
    fetches: AtomicUsize,
}

impl ScriptedHistory {
    pub fn new(records: Vec<HistoricalRecord>) -> Self {
        Self::sequence(vec![records])
    }

    pub fn sequence(responses: Vec<Vec<HistoricalRecord>>) -> Self {
        Self {
            failures: Mutex::new(VecDeque::new()),
            responses: Mutex::new(responses.into()),
            last: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, error: FeedError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoricalData for ScriptedHistory {
    async fn fetch(
        &self,
        _instrument: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _granularity: Duration,
    ) -> Result<Vec<HistoricalRecord>, FeedError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

/// Fills every order at 1.1 with 0.5 P&L. Outcomes can be queued: each
/// submission takes the next one, then everything fills.
#[derive(Default)]
pub struct RecordingBroker {
    submitted: Mutex<Vec<i64>>,
    outcomes: Mutex<VecDeque<Option<OrderSubmissionError>>>,
}

impl RecordingBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_next(&self) {
        self.outcomes.lock().unwrap().push_back(None);
    }

    pub fn fail_next(&self, error: OrderSubmissionError) {
        self.outcomes.lock().unwrap().push_back(Some(error));
    }

    pub fn submitted(&self) -> Vec<i64> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderSubmitter for RecordingBroker {
    async fn submit(&self, instrument: &str, units: i64) -> Result<Order, OrderSubmissionError> {
        if let Some(error) = self.outcomes.lock().unwrap().pop_front().flatten() {
            return Err(error);
        }
        self.submitted.lock().unwrap().push(units);
        Ok(Order {
            id: Uuid::new_v4(),
            instrument: instrument.to_string(),
            units,
            price: price("1.1"),
            time: Utc::now(),
            pl: Decimal::new(5, 1),
        })
    }
}

/// Strategy that answers with queued targets, repeating the last one
pub struct ScriptedStrategy {
    targets: Mutex<VecDeque<Position>>,
    last: Mutex<Position>,
    evaluations: AtomicUsize,
}

impl ScriptedStrategy {
    pub fn new(targets: Vec<Position>) -> Self {
        Self {
            targets: Mutex::new(targets.into()),
            last: Mutex::new(Position::Flat),
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn always(target: Position) -> Self {
        Self::new(vec![target])
    }
}

impl Strategy for ScriptedStrategy {
    fn evaluate(&self, _bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.targets.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(*last)
    }

    fn name(&self) -> &str {
        "Scripted"
    }

    fn min_lookback(&self) -> usize {
        1
    }
}

/// Strategy wrapper so tests can read the evaluation count after the
/// strategy has been boxed into the session
pub struct Shared(pub std::sync::Arc<ScriptedStrategy>);

impl Strategy for Shared {
    fn evaluate(&self, bars: &[Bar]) -> Result<TargetSignal, StrategyError> {
        self.0.evaluate(bars)
    }

    fn name(&self) -> &str {
        self.0.name()
    }

    fn min_lookback(&self) -> usize {
        self.0.min_lookback()
    }
}

impl ScriptedStrategy {
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}
