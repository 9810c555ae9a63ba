//! Ledger data model: transactions, categories, and calendar months

pub mod loader;

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed set of cash-flow categories.
///
/// KPI formulas depend on exact category identity, so this is a fixed enum
/// rather than free text; adding a category is a deliberate schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Sales,
    #[serde(rename = "COGS")]
    Cogs,
    Payroll,
    Opex,
    CapEx,
    #[serde(rename = "Debt Service")]
    DebtService,
    Other,
}

impl Category {
    /// All categories in schedule display order
    pub const ALL: [Category; 7] = [
        Category::Sales,
        Category::Cogs,
        Category::Payroll,
        Category::Opex,
        Category::CapEx,
        Category::DebtService,
        Category::Other,
    ];

    /// External label, matching the importer's fixed vocabulary
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sales => "Sales",
            Category::Cogs => "COGS",
            Category::Payroll => "Payroll",
            Category::Opex => "Opex",
            Category::CapEx => "CapEx",
            Category::DebtService => "Debt Service",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sales" => Ok(Category::Sales),
            "COGS" => Ok(Category::Cogs),
            "Payroll" => Ok(Category::Payroll),
            "Opex" => Ok(Category::Opex),
            "CapEx" => Ok(Category::CapEx),
            "Debt Service" => Ok(Category::DebtService),
            "Other" => Ok(Category::Other),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar month, the engine's bucketing unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    /// Month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A single dated cash transaction, immutable once ingested.
///
/// `amount` is signed: inflows positive, outflows negative. `paid`
/// distinguishes realized cash movements from accrued ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub category: Category,
    pub description: String,
    pub amount: Decimal,
    /// ISO 4217 code
    pub currency: String,
    pub account: String,
    pub paid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
        assert!("Misc".parse::<Category>().is_err());
    }

    #[test]
    fn test_year_month_ordering_and_next() {
        let dec = YearMonth::new(2024, 12);
        let jan = dec.next();
        assert_eq!(jan, YearMonth::new(2025, 1));
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2025-01");
    }

    #[test]
    fn test_year_month_from_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        assert_eq!(YearMonth::from_date(d), YearMonth::new(2024, 3));
    }
}
