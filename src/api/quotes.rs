use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::models::Tick;

/// Latest bid/ask seen for an instrument
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
    pub time: DateTime<Utc>,
}

impl From<&Tick> for Quote {
    fn from(tick: &Tick) -> Self {
        Self {
            bid: tick.bid,
            ask: tick.ask,
            time: tick.timestamp,
        }
    }
}

/// Thread-safe board of the latest quote per instrument
///
/// Written by the paper feed, read by the paper broker to price fills.
#[derive(Clone, Default)]
pub struct QuoteBoard {
    data: Arc<RwLock<HashMap<String, Quote>>>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick as the instrument's latest quote
    pub fn publish(&self, instrument: &str, tick: &Tick) {
        let mut data = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        data.insert(instrument.to_string(), Quote::from(tick));
    }

    pub fn latest(&self, instrument: &str) -> Option<Quote> {
        let data = match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        data.get(instrument).copied()
    }

    /// Get all quoted instruments
    pub fn instruments(&self) -> Vec<String> {
        let data = match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        data.keys().cloned().collect()
    }
}
