use rust_decimal::Decimal;

use crate::models::Order;

/// Append-only record of fills and their realized P&L
///
/// Created with the session and dropped with it; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    fills: Vec<Order>,
    cumulative_pl: Decimal,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book a fill and return the new cumulative P&L
    pub fn record(&mut self, order: Order) -> Decimal {
        self.cumulative_pl += order.pl;
        self.fills.push(order);
        self.cumulative_pl
    }

    /// Get total realized P&L
    pub fn cumulative_pl(&self) -> Decimal {
        self.cumulative_pl
    }

    pub fn fills(&self) -> &[Order] {
        &self.fills
    }

    pub fn last_fill(&self) -> Option<&Order> {
        self.fills.last()
    }

    pub fn len(&self) -> usize {
        self.fills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Sum of signed units across every fill
    pub fn net_units(&self) -> i64 {
        self.fills.iter().map(|o| o.units).sum()
    }
}
