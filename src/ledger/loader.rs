//! CSV ingestion for transactions and fx rates
//!
//! The core operations take fully materialized in-memory collections; this
//! module is the boundary where importer-shaped CSV files become those
//! collections.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::fx::{FxRate, FxTable};
use crate::ledger::{Category, Transaction};

/// Raw CSV row matching the external importer's transaction shape
#[derive(Debug, Deserialize)]
struct TransactionRow {
    date: NaiveDate,
    category: Category,
    description: String,
    amount: Decimal,
    currency: String,
    account: String,
    paid: bool,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            date: row.date,
            category: row.category,
            description: row.description,
            amount: row.amount,
            currency: row.currency,
            account: row.account,
            paid: row.paid,
        }
    }
}

/// Raw CSV row for fx rate files: `date,from_currency,to_currency,rate`
#[derive(Debug, Deserialize)]
struct FxRateRow {
    date: NaiveDate,
    from_currency: String,
    to_currency: String,
    rate: Decimal,
}

fn load_error(path: &str, err: impl std::fmt::Display) -> EngineError {
    EngineError::Load {
        path: path.to_string(),
        message: err.to_string(),
    }
}

/// Read transactions from any CSV source
pub fn read_transactions<R: Read>(reader: R, source: &str) -> Result<Vec<Transaction>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut transactions = Vec::new();

    for record in csv_reader.deserialize::<TransactionRow>() {
        let row = record.map_err(|e| load_error(source, e))?;
        transactions.push(row.into());
    }

    log::info!("loaded {} transactions from {}", transactions.len(), source);
    Ok(transactions)
}

/// Load transactions from a CSV file
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let display = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| load_error(&display, e))?;
    read_transactions(file, &display)
}

/// Read an fx rate table from any CSV source
pub fn read_fx_rates<R: Read>(reader: R, source: &str) -> Result<FxTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rates = Vec::new();

    for record in csv_reader.deserialize::<FxRateRow>() {
        let row = record.map_err(|e| load_error(source, e))?;
        rates.push(FxRate {
            date: row.date,
            from_currency: row.from_currency,
            to_currency: row.to_currency,
            rate: row.rate,
        });
    }

    log::info!("loaded {} fx rates from {}", rates.len(), source);
    FxTable::new(rates)
}

/// Load an fx rate table from a CSV file
pub fn load_fx_rates(path: &Path) -> Result<FxTable> {
    let display = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| load_error(&display, e))?;
    read_fx_rates(file, &display)
}
