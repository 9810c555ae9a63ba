//! Monthly cash-flow projection: engine and output schedule

mod engine;
mod schedule;

pub use engine::{project, ProjectionEngine, MAX_HORIZON_MONTHS};
pub use schedule::{CashflowRow, ProjectionResult, ProjectionSummary};
