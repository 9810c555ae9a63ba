//! Liquidity KPIs derived from a completed projection schedule

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::ledger::YearMonth;
use crate::projection::ProjectionResult;

/// Summary metrics for one projection. Always a pure function of its source
/// schedule; recomputable at any time, never authoritative on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    /// Lowest ending cash balance across the horizon
    pub minimum_cash_position: Decimal,
    /// Earliest month achieving the minimum; that is when the risk hits
    pub month_of_minimum: YearMonth,
    /// `None` means unbounded: no month burned cash
    pub months_of_runway: Option<f64>,
    /// Average of negative net flows only, as a positive magnitude;
    /// zero when no month is negative
    pub average_burn_rate: Decimal,
    /// Debt service coverage ratio; `None` when there is no debt service,
    /// so zero coverage is never mistaken for infinite coverage
    pub dscr: Option<f64>,
    /// Ending cash balance of the last projected month
    pub final_cash_position: Decimal,
}

/// Derive the KPI set from a projection schedule.
///
/// The DSCR numerator is operating cash flow: net flow with both debt
/// service and capex added back, capex being an investing flow. Systems
/// that add back debt service alone will report a lower ratio whenever
/// capex is non-zero.
///
/// Results produced by `project` always carry at least one row; an empty
/// schedule degenerates to the starting cash anchor.
pub fn compute_kpis(result: &ProjectionResult) -> KpiSet {
    let starting_cash = result.drivers.starting_cash;

    let (minimum_cash_position, month_of_minimum) = result
        .rows
        .iter()
        .map(|r| (r.ending_cash, r.month))
        // Strictly-less keeps the earliest month on ties
        .reduce(|best, candidate| if candidate.0 < best.0 { candidate } else { best })
        .unwrap_or((starting_cash, YearMonth::from_date(result.generated_at.date_naive())));

    let burn_months: Vec<Decimal> = result
        .rows
        .iter()
        .filter(|r| r.net_cash_flow < Decimal::ZERO)
        .map(|r| -r.net_cash_flow)
        .collect();

    let average_burn_rate = if burn_months.is_empty() {
        Decimal::ZERO
    } else {
        let total: Decimal = burn_months.iter().sum();
        (total / Decimal::from(burn_months.len()))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    let months_of_runway = if average_burn_rate > Decimal::ZERO {
        (starting_cash / average_burn_rate).to_f64()
    } else {
        None
    };

    let total_debt_service: Decimal = result.rows.iter().map(|r| r.debt_service).sum();
    let dscr = if total_debt_service > Decimal::ZERO {
        (result.operating_cash_flow() / total_debt_service).to_f64()
    } else {
        None
    };

    let final_cash_position = result
        .rows
        .last()
        .map(|r| r.ending_cash)
        .unwrap_or(starting_cash);

    KpiSet {
        minimum_cash_position,
        month_of_minimum,
        months_of_runway,
        average_burn_rate,
        dscr,
        final_cash_position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{LedgerHistory, MonthlyBucket};
    use crate::drivers::{DebtDrivers, DriverSet, ExpenseGrowth};
    use crate::ledger::Category;
    use crate::projection::project;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn drivers(starting_cash: Decimal) -> DriverSet {
        DriverSet {
            label: "Base".to_string(),
            sales_growth_rate: 0.0,
            dso_days: 0.0,
            dpo_days: 0.0,
            tax_rate: 0.0,
            capex_monthly: Decimal::ZERO,
            starting_cash,
            expense_growth: ExpenseGrowth::default(),
            debt: None,
        }
    }

    fn history(sales: Decimal, payroll: Decimal) -> LedgerHistory {
        let month = YearMonth::new(2024, 1);
        LedgerHistory {
            cash: vec![
                MonthlyBucket {
                    month,
                    category: Category::Sales,
                    amount: sales,
                },
                MonthlyBucket {
                    month,
                    category: Category::Payroll,
                    amount: payroll,
                },
            ],
            accrued: Vec::new(),
            months: vec![month],
        }
    }

    #[test]
    fn test_burning_scenario_kpis() {
        // Flat 10k in, 16k out: burns 6000/month from 60k
        let result = project(&history(dec!(10000), dec!(-16000)), &drivers(dec!(60000)), 6).unwrap();
        let kpis = compute_kpis(&result);

        assert_eq!(kpis.average_burn_rate, dec!(6000.00));
        assert_eq!(kpis.minimum_cash_position, dec!(24000.00));
        // Minimum is the final month of a monotone decline
        assert_eq!(kpis.month_of_minimum, YearMonth::new(2024, 7));
        assert_eq!(kpis.final_cash_position, dec!(24000.00));
        assert_relative_eq!(kpis.months_of_runway.unwrap(), 10.0);
        assert_eq!(kpis.dscr, None);
    }

    #[test]
    fn test_runway_unbounded_when_no_month_burns() {
        let result = project(&history(dec!(20000), dec!(-5000)), &drivers(dec!(1000)), 12).unwrap();
        let kpis = compute_kpis(&result);

        assert_eq!(kpis.average_burn_rate, Decimal::ZERO);
        assert_eq!(kpis.months_of_runway, None);
    }

    #[test]
    fn test_minimum_tie_breaks_to_earliest_month() {
        // Zero flows everywhere: every month ties at starting cash
        let result = project(&LedgerHistory::default(), &drivers(dec!(5000)), 4).unwrap();
        let kpis = compute_kpis(&result);

        assert_eq!(kpis.minimum_cash_position, dec!(5000));
        assert_eq!(kpis.month_of_minimum, result.rows[0].month);
    }

    #[test]
    fn test_dscr_present_only_with_debt_service() {
        let mut d = drivers(dec!(50000));
        d.debt = Some(DebtDrivers {
            principal: dec!(24000),
            annual_rate: 0.0,
            term_months: 24,
        });
        // 10k in, 6k payroll out, 1k debt service: operating CF 4000/month
        let result = project(&history(dec!(10000), dec!(-6000)), &d, 12).unwrap();
        let kpis = compute_kpis(&result);

        assert_relative_eq!(kpis.dscr.unwrap(), 4.0);
    }

    #[test]
    fn test_dscr_numerator_adds_back_capex() {
        let mut d = drivers(dec!(50000));
        d.capex_monthly = dec!(2000);
        d.debt = Some(DebtDrivers {
            principal: dec!(12000),
            annual_rate: 0.0,
            term_months: 12,
        });
        // Operating CF stays 4000/month; capex is an investing flow and
        // must not depress the coverage ratio
        let result = project(&history(dec!(10000), dec!(-6000)), &d, 12).unwrap();
        let kpis = compute_kpis(&result);
        assert_relative_eq!(kpis.dscr.unwrap(), 4.0);
    }

    #[test]
    fn test_kpis_recomputable_without_mutation() {
        let result = project(&history(dec!(10000), dec!(-16000)), &drivers(dec!(60000)), 6).unwrap();
        let first = compute_kpis(&result);
        let second = compute_kpis(&result);
        assert_eq!(first, second);
    }
}
