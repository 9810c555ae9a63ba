//! Cashflow Engine CLI
//!
//! Loads a transaction ledger and fx rates, runs one or more scenario
//! projections, and prints the schedules and KPI comparison.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use cashflow_engine::{
    aggregate, compare, ledger::loader, normalize, DriverSet, FxTable, ScenarioComparison,
};
use clap::Parser;
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(name = "cashflow_engine", about = "Monthly cash-flow projection and scenario comparison")]
struct Args {
    /// Transaction ledger CSV (date,category,description,amount,currency,account,paid)
    #[arg(long)]
    transactions: PathBuf,

    /// Fx rate CSV (date,from_currency,to_currency,rate)
    #[arg(long)]
    fx_rates: Option<PathBuf>,

    /// Reporting currency (ISO 4217)
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Scenario driver sets as a JSON array; omit to run a single default Base scenario
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Months to project forward
    #[arg(long, default_value_t = 12)]
    horizon: u32,

    /// Starting cash for the default Base scenario
    #[arg(long, default_value = "0")]
    starting_cash: Decimal,

    /// Write the projected schedules to a CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn default_scenario(starting_cash: Decimal) -> DriverSet {
    DriverSet {
        label: "Base".to_string(),
        sales_growth_rate: 0.02,
        dso_days: 30.0,
        dpo_days: 30.0,
        tax_rate: 0.22,
        capex_monthly: Decimal::ZERO,
        starting_cash,
        expense_growth: Default::default(),
        debt: None,
    }
}

fn load_scenarios(args: &Args) -> anyhow::Result<Vec<DriverSet>> {
    match &args.scenarios {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening scenarios file {}", path.display()))?;
            let sets: Vec<DriverSet> = serde_json::from_reader(file)
                .with_context(|| format!("parsing scenarios file {}", path.display()))?;
            Ok(sets)
        }
        None => Ok(vec![default_scenario(args.starting_cash)]),
    }
}

fn write_schedules_csv(path: &PathBuf, comparison: &ScenarioComparison) -> anyhow::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(
        file,
        "scenario,month,sales,collections,cogs,cogs_paid,payroll,opex,tax,capex,debt_service,net_cash_flow,ending_cash"
    )?;
    for outcome in &comparison.outcomes {
        for row in &outcome.result.rows {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{},{},{},{},{}",
                outcome.label(),
                row.month,
                row.sales,
                row.collections,
                row.cogs,
                row.cogs_paid,
                row.payroll,
                row.opex,
                row.tax,
                row.capex,
                row.debt_service,
                row.net_cash_flow,
                row.ending_cash,
            )?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let transactions = loader::load_transactions(&args.transactions)?;
    let fx_table = match &args.fx_rates {
        Some(path) => loader::load_fx_rates(path)?,
        None => FxTable::default(),
    };
    let scenarios = load_scenarios(&args)?;

    let normalized = normalize(&transactions, &fx_table, &args.currency)?;
    let history = aggregate(&normalized);

    log::info!(
        "history: {} months of actuals, last {}",
        history.months.len(),
        history
            .last_month()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    let comparison = compare(&history, &scenarios, args.horizon)?;

    for outcome in &comparison.outcomes {
        println!("Scenario: {}", outcome.label());
        println!(
            "{:>8} {:>14} {:>14} {:>14} {:>14} {:>14}",
            "Month", "Collections", "Outflows", "Tax", "Net", "Ending"
        );
        println!("{}", "-".repeat(84));
        for row in &outcome.result.rows {
            let outflows = row.cogs_paid + row.payroll + row.opex + row.capex + row.debt_service;
            println!(
                "{:>8} {:>14} {:>14} {:>14} {:>14} {:>14}",
                row.month.to_string(),
                row.collections,
                outflows,
                row.tax,
                row.net_cash_flow,
                row.ending_cash,
            );
        }

        let kpis = &outcome.kpis;
        println!();
        println!("  Minimum cash:   {} ({})", kpis.minimum_cash_position, kpis.month_of_minimum);
        println!("  Avg burn rate:  {}", kpis.average_burn_rate);
        println!(
            "  Runway:         {}",
            kpis.months_of_runway
                .map(|m| format!("{:.1} months", m))
                .unwrap_or_else(|| "unbounded".to_string())
        );
        println!(
            "  DSCR:           {}",
            kpis.dscr
                .map(|d| format!("{:.2}", d))
                .unwrap_or_else(|| "n/a (no debt service)".to_string())
        );
        println!("  Final cash:     {}", kpis.final_cash_position);
        println!();
    }

    if let Some(path) = &args.output {
        write_schedules_csv(path, &comparison)?;
        println!("Schedules written to {}", path.display());
    }

    Ok(())
}
