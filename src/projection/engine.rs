//! Direct-method projection engine for monthly cash-flow schedules

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::aggregate::LedgerHistory;
use crate::drivers::{DriverSet, GrowthRule};
use crate::error::{EngineError, Result};
use crate::ledger::{Category, YearMonth};

use super::schedule::{CashflowRow, ProjectionResult};

/// Hard cap on projection length; runs are short and bounded by design
pub const MAX_HORIZON_MONTHS: u32 = 120;

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn decimal_from(field: &'static str, value: f64) -> Result<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| EngineError::Invariant(format!("{} not representable: {}", field, value)))
}

// Compounding at an accepted-but-extreme growth rate can exceed Decimal's
// range; surface that as a typed error instead of a panic.
fn checked_mul(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| EngineError::Invariant(format!("{} overflowed: {} * {}", field, a, b)))
}

fn checked_add(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| EngineError::Invariant(format!("{} overflowed: {} + {}", field, a, b)))
}

/// Fraction of a flow that lags one month behind, from a day count.
///
/// The linear two-month split covers at most one full month of delay, so
/// day counts beyond 30 clamp to a full one-month lag.
fn lag_fraction(field: &'static str, days: f64) -> Result<Decimal> {
    decimal_from(field, (days / 30.0).clamp(0.0, 1.0))
}

/// Seed magnitude for an expense category: its most recent historical
/// outflow, or zero if the category never appears (or appears as an inflow).
fn expense_seed(history: &LedgerHistory, category: Category) -> Decimal {
    history
        .last_cash_amount(category)
        .map(|amount| round_cents((-amount).max(Decimal::ZERO)))
        .unwrap_or(Decimal::ZERO)
}

/// Stateless projection engine for one driver set.
///
/// Each call is a full recomputation from its inputs; nothing is shared
/// between invocations and concurrent runs are safe.
pub struct ProjectionEngine {
    drivers: DriverSet,
    anchor: Option<YearMonth>,
}

impl ProjectionEngine {
    pub fn new(drivers: DriverSet) -> Self {
        Self {
            drivers,
            anchor: None,
        }
    }

    /// First projected month when the history carries no anchor of its own.
    ///
    /// A non-empty history always wins: projection continues from the month
    /// after its last actuals. Supplying an anchor makes runs over an empty
    /// history fully reproducible, labels included.
    pub fn with_anchor(mut self, anchor: YearMonth) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn drivers(&self) -> &DriverSet {
        &self.drivers
    }

    /// Extend historical actuals forward `horizon_months` months.
    ///
    /// Direct method: sales compound at the driver growth rate from the last
    /// historical Sales bucket; collections and supplier payments are lagged
    /// by DSO/DPO as a linear two-month split (a documented approximation of
    /// a full aging schedule, not a bug); expenses carry forward flat or
    /// track sales per the driver's growth rules; tax applies to positive
    /// cash operating margin only; capex and debt service are flat lines.
    /// Every monetary value is rounded to cents per row.
    ///
    /// Row month labels continue from the last historical month. When the
    /// history is empty and no anchor was set via [`Self::with_anchor`],
    /// labels fall back to the current calendar month and are advisory
    /// only: no monetary value depends on them, so two such runs are
    /// value-identical even if their labels differ across a month boundary.
    pub fn project(
        &self,
        history: &LedgerHistory,
        horizon_months: u32,
    ) -> Result<ProjectionResult> {
        self.drivers.validate()?;
        if horizon_months == 0 || horizon_months > MAX_HORIZON_MONTHS {
            return Err(EngineError::validation(
                "horizon_months",
                format!("must be in 1..={}, got {}", MAX_HORIZON_MONTHS, horizon_months),
            ));
        }

        let growth = decimal_from("sales_growth_rate", 1.0 + self.drivers.sales_growth_rate)?;
        let tax_rate = decimal_from("tax_rate", self.drivers.tax_rate)?;
        let dso_lag = lag_fraction("dso_days", self.drivers.dso_days)?;
        let dpo_lag = lag_fraction("dpo_days", self.drivers.dpo_days)?;
        let capex = round_cents(self.drivers.capex_monthly);
        let debt_payment = self.drivers.debt.as_ref().map(|d| d.monthly_payment());

        // Seeds: last historical value per category, zero when absent. An
        // empty history projects from starting_cash alone.
        let mut sales_prev = history
            .last_cash_amount(Category::Sales)
            .map(round_cents)
            .unwrap_or(Decimal::ZERO);
        let mut cogs_prev = expense_seed(history, Category::Cogs);
        let mut payroll_prev = expense_seed(history, Category::Payroll);
        let mut opex_prev = expense_seed(history, Category::Opex);

        // Row labels continue from the last actuals; with no history they
        // come from the configured anchor, or failing that the current
        // calendar month (advisory only, see `project` docs). Monetary math
        // never depends on the label.
        let mut month = history
            .last_month()
            .map(|m| m.next())
            .or(self.anchor)
            .unwrap_or_else(|| YearMonth::from_date(Utc::now().date_naive()));

        let grow = |prev: Decimal, rule: GrowthRule| -> Result<Decimal> {
            match rule {
                GrowthRule::TracksSales => {
                    Ok(round_cents(checked_mul("expense growth", prev, growth)?))
                }
                GrowthRule::Flat => Ok(prev),
            }
        };

        let mut rows = Vec::with_capacity(horizon_months as usize);
        let mut ending_cash = round_cents(self.drivers.starting_cash);

        for i in 1..=horizon_months {
            let sales = round_cents(checked_mul("sales growth", sales_prev, growth)?);
            let collections =
                round_cents(sales * (Decimal::ONE - dso_lag) + sales_prev * dso_lag);

            let cogs = grow(cogs_prev, self.drivers.expense_growth.rule(Category::Cogs))?;
            let cogs_paid = round_cents(cogs * (Decimal::ONE - dpo_lag) + cogs_prev * dpo_lag);

            let payroll = grow(payroll_prev, self.drivers.expense_growth.rule(Category::Payroll))?;
            let opex = grow(opex_prev, self.drivers.expense_growth.rule(Category::Opex))?;

            // No tax credit on losses
            let margin = collections - cogs_paid - payroll - opex;
            let tax = if margin > Decimal::ZERO {
                round_cents(checked_mul("tax", margin, tax_rate)?)
            } else {
                Decimal::ZERO
            };

            let debt_service = match (&self.drivers.debt, debt_payment) {
                (Some(debt), Some(payment)) if i <= debt.term_months => payment,
                _ => Decimal::ZERO,
            };

            let net_cash_flow =
                collections - cogs_paid - payroll - opex - tax - capex - debt_service;
            ending_cash = checked_add("ending cash", ending_cash, net_cash_flow)?;

            rows.push(CashflowRow {
                month,
                sales,
                collections,
                cogs,
                cogs_paid,
                payroll,
                opex,
                tax,
                capex,
                debt_service,
                net_cash_flow,
                ending_cash,
            });

            sales_prev = sales;
            cogs_prev = cogs;
            payroll_prev = payroll;
            opex_prev = opex;
            month = month.next();
        }

        log::debug!(
            "projected scenario '{}' {} months, final cash {}",
            self.drivers.label,
            horizon_months,
            ending_cash
        );

        Ok(ProjectionResult {
            scenario_label: self.drivers.label.clone(),
            rows,
            drivers: self.drivers.clone(),
            generated_at: Utc::now(),
        })
    }
}

/// Convenience wrapper over [`ProjectionEngine`] matching the core contract
pub fn project(
    history: &LedgerHistory,
    drivers: &DriverSet,
    horizon_months: u32,
) -> Result<ProjectionResult> {
    ProjectionEngine::new(drivers.clone()).project(history, horizon_months)
}
