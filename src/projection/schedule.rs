//! Projection output structures: monthly rows and completed schedules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::drivers::DriverSet;
use crate::ledger::{Category, YearMonth};

/// One projected month of cash flows.
///
/// Expense lines (`cogs`, `cogs_paid`, `payroll`, `opex`, `tax`, `capex`,
/// `debt_service`) are stored as positive magnitudes, statement-style;
/// `category_amount` exposes the signed cash view. All values are rounded to
/// 2 decimal places when the row is produced, not at the end of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowRow {
    pub month: YearMonth,

    /// Sales booked in the month (accrual view, drives growth compounding)
    pub sales: Decimal,
    /// Cash actually collected in the month after the DSO lag
    pub collections: Decimal,

    /// COGS incurred in the month
    pub cogs: Decimal,
    /// COGS actually paid in the month after the DPO lag
    pub cogs_paid: Decimal,

    pub payroll: Decimal,
    pub opex: Decimal,
    pub tax: Decimal,
    pub capex: Decimal,
    pub debt_service: Decimal,

    pub net_cash_flow: Decimal,
    pub ending_cash: Decimal,
}

impl CashflowRow {
    /// Signed cash amount attributed to a category this month.
    ///
    /// Inflows positive, outflows negative; `Other` carries no projected
    /// flow (it exists only in historical actuals).
    pub fn category_amount(&self, category: Category) -> Decimal {
        match category {
            Category::Sales => self.collections,
            Category::Cogs => -self.cogs_paid,
            Category::Payroll => -self.payroll,
            Category::Opex => -self.opex,
            Category::CapEx => -self.capex,
            Category::DebtService => -self.debt_service,
            Category::Other => Decimal::ZERO,
        }
    }
}

/// A completed projection for one scenario. Immutable once produced; a new
/// run yields a new result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub scenario_label: String,
    pub rows: Vec<CashflowRow>,
    /// The driver set the schedule was produced from
    pub drivers: DriverSet,
    pub generated_at: DateTime<Utc>,
}

impl ProjectionResult {
    /// Summary totals over the whole schedule
    pub fn summary(&self) -> ProjectionSummary {
        let total_collections: Decimal = self.rows.iter().map(|r| r.collections).sum();
        let total_cogs_paid: Decimal = self.rows.iter().map(|r| r.cogs_paid).sum();
        let total_payroll: Decimal = self.rows.iter().map(|r| r.payroll).sum();
        let total_opex: Decimal = self.rows.iter().map(|r| r.opex).sum();
        let total_tax: Decimal = self.rows.iter().map(|r| r.tax).sum();
        let total_capex: Decimal = self.rows.iter().map(|r| r.capex).sum();
        let total_debt_service: Decimal = self.rows.iter().map(|r| r.debt_service).sum();
        let total_net: Decimal = self.rows.iter().map(|r| r.net_cash_flow).sum();

        ProjectionSummary {
            months: self.rows.len() as u32,
            total_collections,
            total_cogs_paid,
            total_payroll,
            total_opex,
            total_tax,
            total_capex,
            total_debt_service,
            total_net,
            final_cash: self
                .rows
                .last()
                .map(|r| r.ending_cash)
                .unwrap_or(self.drivers.starting_cash),
        }
    }

    /// Cash generated by operations: net flow with investing (capex) and
    /// financing (debt service) added back. This is the DSCR numerator.
    pub fn operating_cash_flow(&self) -> Decimal {
        self.rows
            .iter()
            .map(|r| r.net_cash_flow + r.capex + r.debt_service)
            .sum()
    }
}

/// Summary totals for one projection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub months: u32,
    pub total_collections: Decimal,
    pub total_cogs_paid: Decimal,
    pub total_payroll: Decimal,
    pub total_opex: Decimal,
    pub total_tax: Decimal,
    pub total_capex: Decimal,
    pub total_debt_service: Decimal,
    pub total_net: Decimal,
    pub final_cash: Decimal,
}
