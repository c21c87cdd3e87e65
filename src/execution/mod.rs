// Position execution and fill accounting
pub mod executor;
pub mod ledger;

pub use executor::{going_label, plan, ExecutionAction, ExecutionDecision, PositionExecutor};
pub use ledger::TradeLedger;
