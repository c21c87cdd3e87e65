use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single bid/ask update from the live feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub bid: Decimal,
    pub ask: Decimal,
}

impl Tick {
    pub fn new(timestamp: DateTime<Utc>, bid: Decimal, ask: Decimal) -> Self {
        Self { timestamp, bid, ask }
    }

    /// Mid price, the value folded into bars
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }
}

/// One sub-bar record returned by the historical data service (mid close)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
}

/// Fixed-duration OHLC aggregate, right-labeled by `end` (exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Bar {
    /// Bar with open = high = low = close, used for forward-filled intervals
    pub fn flat(start: DateTime<Utc>, end: DateTime<Utc>, price: Decimal) -> Self {
        Self {
            start,
            end,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_flat(&self) -> bool {
        self.open == self.close && self.high == self.close && self.low == self.close
    }
}

/// Held exposure. At most one unit-size block long or short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Position {
    Short,
    #[default]
    Flat,
    Long,
}

impl Position {
    pub fn direction(self) -> i64 {
        match self {
            Position::Short => -1,
            Position::Flat => 0,
            Position::Long => 1,
        }
    }

    pub fn from_direction(direction: i64) -> Option<Self> {
        match direction {
            -1 => Some(Position::Short),
            0 => Some(Position::Flat),
            1 => Some(Position::Long),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Short => write!(f, "SHORT"),
            Position::Flat => write!(f, "FLAT"),
            Position::Long => write!(f, "LONG"),
        }
    }
}

/// Desired position produced by a strategy for the latest closed bar
pub type TargetSignal = Position;

/// Broker confirmation of a filled order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub instrument: String,
    /// Signed: positive buys, negative sells
    pub units: i64,
    pub price: Decimal,
    pub time: DateTime<Utc>,
    /// Realized P&L contributed by this fill
    pub pl: Decimal,
}
