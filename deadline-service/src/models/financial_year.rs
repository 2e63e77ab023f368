use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Indian financial year, April of `start_year` to March of `start_year + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialYear {
    pub start_year: i32,
}

impl FinancialYear {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// The financial year a calendar date belongs to.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 4 {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    /// The twelve `(month, year)` reporting periods in calendar order from April.
    pub fn periods(&self) -> impl Iterator<Item = (u32, i32)> {
        let start = self.start_year;
        (0..12u32).map(move |offset| {
            let month = (3 + offset) % 12 + 1;
            let year = if month >= 4 { start } else { start + 1 };
            (month, year)
        })
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY {}-{:02}", self.start_year, (self.start_year + 1) % 100)
    }
}
