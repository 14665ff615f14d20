// Decision delivery and order sizing
pub mod executor;
pub mod sink;

pub use executor::{plan_from_fraction, plan_order, Balances, ExecutionAction, ExecutionDecision};
pub use sink::{DecisionSink, LogSink, RecordingSink};
