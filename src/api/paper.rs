use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{OrderSubmitter, QuoteBoard};
use crate::error::OrderSubmissionError;
use crate::models::Order;

/// Net exposure the paper broker keeps per instrument
#[derive(Debug, Clone, Copy, Default)]
struct Book {
    units: i64,
    avg_price: Decimal,
}

impl Book {
    /// Apply a fill and return the P&L it realizes
    fn fill(&mut self, units: i64, price: Decimal) -> Decimal {
        let mut realized = Decimal::ZERO;
        let mut remaining = units;

        // Reducing (or reversing) existing exposure
        if self.units != 0 && self.units.signum() != units.signum() {
            let closed = units.abs().min(self.units.abs());
            let side = Decimal::from(self.units.signum());
            realized = (price - self.avg_price) * Decimal::from(closed) * side;
            self.units += closed * units.signum();
            remaining -= closed * units.signum();
            if self.units == 0 {
                self.avg_price = Decimal::ZERO;
            }
        }

        // Adding exposure on the (possibly new) side
        if remaining != 0 {
            let held = Decimal::from(self.units.abs());
            let added = Decimal::from(remaining.abs());
            self.avg_price = (self.avg_price * held + price * added) / (held + added);
            self.units += remaining;
        }

        realized
    }
}

/// Fills market orders instantly at the board's bid (sells) or ask (buys)
///
/// Realized P&L is booked only when an order reduces exposure, the way an
/// FX broker reports it on the closing trade.
pub struct PaperBroker {
    quotes: QuoteBoard,
    books: Mutex<HashMap<String, Book>>,
}

impl PaperBroker {
    pub fn new(quotes: QuoteBoard) -> Self {
        Self {
            quotes,
            books: Mutex::new(HashMap::new()),
        }
    }

    /// Net units currently held for an instrument
    pub async fn net_units(&self, instrument: &str) -> i64 {
        let books = self.books.lock().await;
        books.get(instrument).map(|b| b.units).unwrap_or(0)
    }
}

#[async_trait]
impl OrderSubmitter for PaperBroker {
    async fn submit(&self, instrument: &str, units: i64) -> Result<Order, OrderSubmissionError> {
        if units == 0 {
            return Err(OrderSubmissionError::Rejected("zero units".to_string()));
        }
        let quote = self.quotes.latest(instrument).ok_or_else(|| {
            OrderSubmissionError::Rejected(format!("no quote for {instrument}"))
        })?;

        let price = if units > 0 { quote.ask } else { quote.bid };

        let mut books = self.books.lock().await;
        let pl = books
            .entry(instrument.to_string())
            .or_default()
            .fill(units, price);

        Ok(Order {
            id: Uuid::new_v4(),
            instrument: instrument.to_string(),
            units,
            price,
            time: quote.time,
            pl,
        })
    }
}
