use std::sync::Arc;

use crate::api::OrderSubmitter;
use crate::error::OrderSubmissionError;
use crate::execution::TradeLedger;
use crate::models::{Order, Position, TargetSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionAction {
    /// Signed market order size
    Submit { units: i64 },
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionDecision {
    pub action: ExecutionAction,
    pub reason: String,
}

/// Report label for a move to `target`
pub fn going_label(target: Position) -> &'static str {
    match target {
        Position::Long => "GOING LONG",
        Position::Short => "GOING SHORT",
        Position::Flat => "GOING NEUTRAL",
    }
}

/// Decide the order that takes `held` to `target`
///
/// The executor always targets the absolute position, so a flip closes the
/// old exposure and opens the new one in a single 2x order.
pub fn plan(held: Position, target: TargetSignal, unit_size: i64) -> ExecutionDecision {
    let delta = target.direction() - held.direction();
    if delta == 0 {
        return ExecutionDecision {
            action: ExecutionAction::Skip,
            reason: format!("Already {held}"),
        };
    }

    ExecutionDecision {
        action: ExecutionAction::Submit {
            units: delta * unit_size,
        },
        reason: going_label(target).to_string(),
    }
}

/// Owns the held position and the ledger of fills that produced it
pub struct PositionExecutor {
    instrument: String,
    unit_size: i64,
    held: Position,
    broker: Arc<dyn OrderSubmitter>,
    ledger: TradeLedger,
}

impl PositionExecutor {
    pub fn new(instrument: impl Into<String>, unit_size: i64, broker: Arc<dyn OrderSubmitter>) -> Self {
        Self {
            instrument: instrument.into(),
            unit_size,
            held: Position::Flat,
            broker,
            ledger: TradeLedger::new(),
        }
    }

    pub fn held(&self) -> Position {
        self.held
    }

    pub fn unit_size(&self) -> i64 {
        self.unit_size
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    /// Move the held position to `target`.
    ///
    /// Returns the fill, or `None` when already there. On failure nothing
    /// changes and the broker error is handed back to the caller.
    pub async fn apply(&mut self, target: TargetSignal) -> Result<Option<Order>, OrderSubmissionError> {
        let decision = plan(self.held, target, self.unit_size);

        let units = match decision.action {
            ExecutionAction::Skip => {
                tracing::debug!(held = %self.held, "{}", decision.reason);
                return Ok(None);
            }
            ExecutionAction::Submit { units } => units,
        };

        let order = match self.broker.submit(&self.instrument, units).await {
            Ok(order) => order,
            Err(e) => {
                tracing::error!(
                    instrument = %self.instrument,
                    units,
                    held = %self.held,
                    target = %target,
                    error = %e,
                    "❌ Order failed, position unchanged"
                );
                return Err(e);
            }
        };

        self.held = target;
        let cum_pl = self.ledger.record(order.clone());

        tracing::info!(
            time = %order.time,
            instrument = %order.instrument,
            units = order.units,
            price = %order.price,
            pl = %order.pl,
            cum_pl = %cum_pl,
            "💱 {}",
            decision.reason
        );

        Ok(Some(order))
    }

    /// Drive the held position to FLAT regardless of the last signal
    pub async fn flatten(&mut self) -> Result<Option<Order>, OrderSubmissionError> {
        self.apply(Position::Flat).await
    }
}
