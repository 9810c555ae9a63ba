//! Bucketing of normalized transactions into monthly historical actuals

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{Category, Transaction, YearMonth};

/// Sum of one category's transactions within one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub month: YearMonth,
    pub category: Category,
    pub amount: Decimal,
}

/// Monthly historical actuals derived from a transaction set.
///
/// `cash` holds paid transactions only and is the anchor for projection
/// continuity; accrued (unpaid) activity is bucketed separately so it can be
/// reported without contaminating the cash basis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerHistory {
    pub cash: Vec<MonthlyBucket>,
    pub accrued: Vec<MonthlyBucket>,
    /// Distinct months present in `cash`, ascending
    pub months: Vec<YearMonth>,
}

impl LedgerHistory {
    /// Most recent cash bucket for a category, if any month recorded one
    pub fn last_cash_amount(&self, category: Category) -> Option<Decimal> {
        self.cash
            .iter()
            .rev()
            .find(|b| b.category == category)
            .map(|b| b.amount)
    }

    /// Last historical month, the point projection continues from
    pub fn last_month(&self) -> Option<YearMonth> {
        self.months.last().copied()
    }
}

/// Bucket normalized transactions by (calendar month, category).
///
/// Every transaction lands in exactly one bucket; amounts are summed as-is,
/// so the signed total across all buckets equals the signed total of the
/// inputs. Output is sorted ascending by month, then category.
pub fn aggregate(transactions: &[Transaction]) -> LedgerHistory {
    let mut cash: BTreeMap<(YearMonth, Category), Decimal> = BTreeMap::new();
    let mut accrued: BTreeMap<(YearMonth, Category), Decimal> = BTreeMap::new();

    for tx in transactions {
        let key = (YearMonth::from_date(tx.date), tx.category);
        let target = if tx.paid { &mut cash } else { &mut accrued };
        *target.entry(key).or_insert(Decimal::ZERO) += tx.amount;
    }

    let to_buckets = |map: BTreeMap<(YearMonth, Category), Decimal>| {
        map.into_iter()
            .map(|((month, category), amount)| MonthlyBucket {
                month,
                category,
                amount,
            })
            .collect::<Vec<_>>()
    };

    let cash = to_buckets(cash);
    let accrued = to_buckets(accrued);

    let mut months: Vec<YearMonth> = cash.iter().map(|b| b.month).collect();
    months.dedup();

    log::debug!(
        "aggregated {} transactions into {} cash buckets across {} months",
        transactions.len(),
        cash.len(),
        months.len()
    );

    LedgerHistory {
        cash,
        accrued,
        months,
    }
}
