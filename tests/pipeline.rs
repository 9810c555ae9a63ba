//! End-to-end pipeline tests: normalize -> aggregate -> compare

use cashflow_engine::{
    aggregate, compare, compute_kpis, ledger::loader, normalize, project, Category, DriverSet,
    EngineError, FxRate, FxTable, Transaction, YearMonth,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(
    d: NaiveDate,
    category: Category,
    amount: Decimal,
    currency: &str,
    paid: bool,
) -> Transaction {
    Transaction {
        date: d,
        category,
        description: String::new(),
        amount,
        currency: currency.to_string(),
        account: "Operating".to_string(),
        paid,
    }
}

fn sample_ledger() -> Vec<Transaction> {
    vec![
        tx(date(2024, 1, 10), Category::Sales, dec!(40000), "USD", true),
        tx(date(2024, 1, 12), Category::Sales, dec!(5000), "EUR", true),
        tx(date(2024, 1, 25), Category::Payroll, dec!(-22000), "USD", true),
        tx(date(2024, 1, 28), Category::Cogs, dec!(-9000), "USD", true),
        tx(date(2024, 2, 8), Category::Sales, dec!(45000), "USD", true),
        tx(date(2024, 2, 20), Category::Payroll, dec!(-22000), "USD", true),
        tx(date(2024, 2, 22), Category::Cogs, dec!(-10000), "USD", true),
        // Accrued invoice, must not move the cash anchor
        tx(date(2024, 2, 27), Category::Sales, dec!(99000), "USD", false),
    ]
}

fn sample_fx() -> FxTable {
    FxTable::new(vec![FxRate {
        date: date(2024, 1, 1),
        from_currency: "EUR".to_string(),
        to_currency: "USD".to_string(),
        rate: dec!(1.10),
    }])
    .unwrap()
}

fn drivers(label: &str, growth: f64) -> DriverSet {
    DriverSet {
        label: label.to_string(),
        sales_growth_rate: growth,
        dso_days: 30.0,
        dpo_days: 15.0,
        tax_rate: 0.22,
        capex_monthly: dec!(1200),
        starting_cash: dec!(75000),
        expense_growth: Default::default(),
        debt: None,
    }
}

#[test]
fn full_pipeline_produces_consistent_schedules() {
    let normalized = normalize(&sample_ledger(), &sample_fx(), "USD").unwrap();
    let history = aggregate(&normalized);

    // EUR sale converted at 1.10 and folded into January's Sales bucket
    let january_sales = history
        .cash
        .iter()
        .find(|b| b.month == YearMonth::new(2024, 1) && b.category == Category::Sales)
        .unwrap();
    assert_eq!(january_sales.amount, dec!(45500.00));

    // Accrued sale lands in the accrued buckets only
    assert_eq!(history.last_cash_amount(Category::Sales), Some(dec!(45000)));
    assert_eq!(history.accrued.len(), 1);

    let sets = vec![
        drivers("Base", 0.02),
        drivers("Optimistic", 0.06),
        drivers("Pessimistic", -0.04),
    ];
    let comparison = compare(&history, &sets, 18).unwrap();
    assert_eq!(comparison.outcomes.len(), 3);

    for outcome in &comparison.outcomes {
        // Projection starts the month after the last actuals
        assert_eq!(outcome.result.rows[0].month, YearMonth::new(2024, 3));

        // Balance chaining holds across the whole schedule
        let mut previous = dec!(75000);
        for row in &outcome.result.rows {
            assert_eq!(row.ending_cash, previous + row.net_cash_flow);
            previous = row.ending_cash;
        }
        assert_eq!(outcome.kpis.final_cash_position, previous);
    }

    // Faster growth can only help the final position
    let base = comparison.get("Base").unwrap();
    let optimistic = comparison.get("Optimistic").unwrap();
    let pessimistic = comparison.get("Pessimistic").unwrap();
    assert!(optimistic.kpis.final_cash_position > base.kpis.final_cash_position);
    assert!(base.kpis.final_cash_position > pessimistic.kpis.final_cash_position);
}

#[test]
fn comparison_equals_independent_projection_runs() {
    let normalized = normalize(&sample_ledger(), &sample_fx(), "USD").unwrap();
    let history = aggregate(&normalized);
    let sets = vec![drivers("Base", 0.02), drivers("Optimistic", 0.06)];

    let comparison = compare(&history, &sets, 12).unwrap();
    for set in &sets {
        let standalone = project(&history, set, 12).unwrap();
        let outcome = comparison.get(&set.label).unwrap();
        assert_eq!(outcome.result.rows, standalone.rows);
        assert_eq!(outcome.kpis, compute_kpis(&standalone));
    }
}

#[test]
fn missing_rate_fails_before_aggregation() {
    let err = normalize(&sample_ledger(), &FxTable::default(), "USD").unwrap_err();
    assert!(matches!(err, EngineError::MissingRate { .. }));
}

#[test]
fn csv_ledger_round_trips_through_the_pipeline() {
    let csv = "\
date,category,description,amount,currency,account,paid
2024-01-10,Sales,Invoice 1,40000.00,USD,Operating,true
2024-01-25,Payroll,January payroll,-22000.00,USD,Operating,true
2024-02-08,Sales,Invoice 2,45000.00,USD,Operating,true
";
    let transactions = loader::read_transactions(csv.as_bytes(), "inline").unwrap();
    let normalized = normalize(&transactions, &FxTable::default(), "USD").unwrap();
    let history = aggregate(&normalized);

    let input_total: Decimal = transactions.iter().map(|t| t.amount).sum();
    let bucket_total: Decimal = history.cash.iter().map(|b| b.amount).sum();
    assert_eq!(bucket_total, input_total);

    let result = project(&history, &drivers("Base", 0.02), 6).unwrap();
    assert_eq!(result.rows.len(), 6);
    assert_eq!(result.rows[0].sales, dec!(45900.00));
}
