//! Currency normalization against a dated exchange-rate table

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::ledger::Transaction;

/// One dated exchange-rate observation for a currency pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    pub date: NaiveDate,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
}

/// Lookup table over dated fx rates.
///
/// The rate applied to a transaction is the latest observation at or before
/// the transaction date, for the exact pair. When only the reverse pair is
/// quoted its reciprocal is used.
#[derive(Debug, Clone, Default)]
pub struct FxTable {
    rates: Vec<FxRate>,
}

impl FxTable {
    /// Build a table, rejecting non-positive rates up front
    pub fn new(mut rates: Vec<FxRate>) -> Result<Self> {
        for r in &rates {
            if r.rate <= Decimal::ZERO {
                return Err(EngineError::validation(
                    "fx_rate",
                    format!(
                        "rate for {}->{} on {} must be positive, got {}",
                        r.from_currency, r.to_currency, r.date, r.rate
                    ),
                ));
            }
        }
        rates.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(Self { rates })
    }

    /// Latest rate for `from -> to` at or before `as_of`, if any.
    ///
    /// Tries the direct pair first, then the reciprocal of the reverse pair.
    pub fn rate_as_of(&self, from: &str, to: &str, as_of: NaiveDate) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        let latest = |a: &str, b: &str| {
            self.rates
                .iter()
                .rev()
                .find(|r| r.date <= as_of && r.from_currency == a && r.to_currency == b)
                .map(|r| r.rate)
        };
        latest(from, to).or_else(|| latest(to, from).map(|r| Decimal::ONE / r))
    }
}

/// Convert every transaction into the reporting currency.
///
/// Transactions already in the reporting currency pass through unchanged;
/// others are multiplied by the applicable dated rate and rounded to cents.
/// A single unresolvable currency/date aborts the whole batch, since a
/// partially normalized set silently corrupts every downstream total.
pub fn normalize(
    transactions: &[Transaction],
    fx_rates: &FxTable,
    reporting_currency: &str,
) -> Result<Vec<Transaction>> {
    let mut normalized = Vec::with_capacity(transactions.len());

    for tx in transactions {
        if tx.currency == reporting_currency {
            normalized.push(tx.clone());
            continue;
        }

        let rate = fx_rates
            .rate_as_of(&tx.currency, reporting_currency, tx.date)
            .ok_or_else(|| EngineError::MissingRate {
                currency: tx.currency.clone(),
                reporting: reporting_currency.to_string(),
                date: tx.date,
            })?;

        let mut converted = tx.clone();
        converted.amount = (tx.amount * rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        converted.currency = reporting_currency.to_string();
        normalized.push(converted);
    }

    log::debug!(
        "normalized {} transactions to {}",
        normalized.len(),
        reporting_currency
    );
    Ok(normalized)
}
