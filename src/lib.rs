//! Cashflow Engine - Deterministic monthly cash-flow projection and scenario comparison
//!
//! This library provides:
//! - Currency normalization of dated transactions against an fx rate table
//! - Monthly bucketing of historical actuals by category
//! - Direct-method cash-flow projection driven by per-scenario assumptions
//! - Liquidity KPIs (minimum cash, burn rate, runway, DSCR)
//! - Side-by-side comparison of scenarios over a shared historical base
//!
//! The core is computation-only and stateless per call: no I/O, no shared
//! mutable state, every run a full recomputation from its inputs.

pub mod aggregate;
pub mod drivers;
pub mod error;
pub mod fx;
pub mod kpi;
pub mod ledger;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use aggregate::{aggregate, LedgerHistory, MonthlyBucket};
pub use drivers::{DebtDrivers, DriverSet, ExpenseGrowth, GrowthRule};
pub use error::{EngineError, Result};
pub use fx::{normalize, FxRate, FxTable};
pub use kpi::{compute_kpis, KpiSet};
pub use ledger::{Category, Transaction, YearMonth};
pub use projection::{project, CashflowRow, ProjectionEngine, ProjectionResult, MAX_HORIZON_MONTHS};
pub use scenario::{compare, ScenarioComparison, ScenarioOutcome};
