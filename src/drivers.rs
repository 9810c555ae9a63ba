//! Forward-looking assumption bundles that parameterize a projection run

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::ledger::Category;

/// How an expense category evolves beyond the historical anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthRule {
    /// Compounds at the sales growth rate each projected month
    TracksSales,
    /// Carried forward flat from the last historical value
    Flat,
}

/// Per-category growth linkage for the projected expense lines.
///
/// Convention: COGS tracks sales volume, payroll and opex are flat until a
/// driver says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseGrowth {
    pub cogs: GrowthRule,
    pub payroll: GrowthRule,
    pub opex: GrowthRule,
}

impl Default for ExpenseGrowth {
    fn default() -> Self {
        Self {
            cogs: GrowthRule::TracksSales,
            payroll: GrowthRule::Flat,
            opex: GrowthRule::Flat,
        }
    }
}

impl ExpenseGrowth {
    pub fn rule(&self, category: Category) -> GrowthRule {
        match category {
            Category::Cogs => self.cogs,
            Category::Payroll => self.payroll,
            Category::Opex => self.opex,
            _ => GrowthRule::Flat,
        }
    }
}

/// Outstanding debt to be serviced over the projection horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtDrivers {
    pub principal: Decimal,
    /// Annual interest rate, fractional
    pub annual_rate: f64,
    pub term_months: u32,
}

impl DebtDrivers {
    /// Level monthly payment over the term (standard amortization).
    ///
    /// Zero-interest debt divides the principal evenly across the term.
    pub fn monthly_payment(&self) -> Decimal {
        use rust_decimal::prelude::ToPrimitive;

        if self.principal <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let principal = self.principal.to_f64().unwrap_or(0.0);
        let monthly_rate = self.annual_rate / 12.0;
        let n = self.term_months as f64;

        let payment = if monthly_rate > 0.0 {
            let factor = (1.0 + monthly_rate).powf(n);
            principal * monthly_rate * factor / (factor - 1.0)
        } else {
            principal / n
        };

        Decimal::from_f64(payment)
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Immutable bundle of forward-looking assumptions for one scenario.
///
/// Constructed by the caller, validated before any projection math runs, and
/// threaded explicitly through every call; there is no ambient "current
/// scenario" state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSet {
    /// Scenario label, e.g. "Base" or "Optimistic"
    pub label: String,
    /// Monthly sales growth, fractional (0.02 = 2% per month)
    pub sales_growth_rate: f64,
    /// Days Sales Outstanding: average collection delay
    pub dso_days: f64,
    /// Days Payable Outstanding: average supplier payment delay
    pub dpo_days: f64,
    /// Tax rate applied to positive operating margin
    pub tax_rate: f64,
    /// Flat capital expenditure per projected month
    pub capex_monthly: Decimal,
    /// Cash balance anchoring the projection
    pub starting_cash: Decimal,
    #[serde(default)]
    pub expense_growth: ExpenseGrowth,
    #[serde(default)]
    pub debt: Option<DebtDrivers>,
}

impl DriverSet {
    /// Reject out-of-domain assumptions before any math runs.
    ///
    /// Multiplicative rates must stay above -100% so no category flips sign;
    /// delays, tax, and capex must be non-negative and finite.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(EngineError::validation("label", "scenario label is empty"));
        }
        for (field, value) in [
            ("sales_growth_rate", self.sales_growth_rate),
            ("dso_days", self.dso_days),
            ("dpo_days", self.dpo_days),
            ("tax_rate", self.tax_rate),
        ] {
            if !value.is_finite() {
                return Err(EngineError::validation(
                    field,
                    format!("must be finite, got {}", value),
                ));
            }
        }
        if self.sales_growth_rate <= -1.0 {
            return Err(EngineError::validation(
                "sales_growth_rate",
                format!("must be > -100%, got {}", self.sales_growth_rate),
            ));
        }
        if self.dso_days < 0.0 {
            return Err(EngineError::validation(
                "dso_days",
                format!("must be >= 0, got {}", self.dso_days),
            ));
        }
        if self.dpo_days < 0.0 {
            return Err(EngineError::validation(
                "dpo_days",
                format!("must be >= 0, got {}", self.dpo_days),
            ));
        }
        if self.tax_rate < 0.0 {
            return Err(EngineError::validation(
                "tax_rate",
                format!("must be >= 0, got {}", self.tax_rate),
            ));
        }
        if self.capex_monthly < Decimal::ZERO {
            return Err(EngineError::validation(
                "capex_monthly",
                format!("must be >= 0, got {}", self.capex_monthly),
            ));
        }
        if let Some(debt) = &self.debt {
            if debt.principal < Decimal::ZERO {
                return Err(EngineError::validation(
                    "debt.principal",
                    format!("must be >= 0, got {}", debt.principal),
                ));
            }
            if !debt.annual_rate.is_finite() || debt.annual_rate < 0.0 {
                return Err(EngineError::validation(
                    "debt.annual_rate",
                    format!("must be finite and >= 0, got {}", debt.annual_rate),
                ));
            }
            if debt.term_months == 0 {
                return Err(EngineError::validation(
                    "debt.term_months",
                    "must be at least 1 month",
                ));
            }
        }
        Ok(())
    }
}
