//! Deterministic statutory filing calendar.

use crate::models::{ClientRecord, ComplianceCalendarEntry, Deadline, FinancialYear};
use chrono::{Datelike, NaiveDate};

/// Every deadline `calendar` implies for `client` in `financial_year`.
///
/// Pure apart from fresh ids and timestamps: nothing is looked up or
/// persisted, and calling it twice yields two full sets. Callers persist via
/// the repository's keyed upsert.
pub fn generate_deadlines(
    client: &ClientRecord,
    calendar: &[ComplianceCalendarEntry],
    financial_year: FinancialYear,
) -> Vec<Deadline> {
    let mut deadlines = Vec::new();

    for (month, year) in financial_year.periods() {
        for entry in calendar {
            let due_date = if entry.recurring {
                let (due_month, due_year) = following_month(month, year);
                clamped_date(due_year, due_month, entry.day_of_month)
            } else if entry.month == Some(month) {
                clamped_date(year, month, entry.day_of_month)
            } else {
                continue;
            };

            deadlines.push(Deadline::new(
                client.firm_id.clone(),
                client.assigned_ca_id.clone(),
                client.client_id.clone(),
                entry.obligation_type.clone(),
                month as i32,
                year,
                due_date,
            ));
        }
    }

    tracing::debug!(
        client_id = %client.client_id,
        financial_year = %financial_year,
        count = deadlines.len(),
        "Generated deadlines"
    );

    deadlines
}

fn following_month(month: u32, year: i32) -> (u32, i32) {
    if month == 12 {
        (1, year + 1)
    } else {
        (month + 1, year)
    }
}

/// `day` in the given month, pulled back to the month's last day when the
/// month is shorter (a day-31 obligation falls on 28/29 February).
fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let last_day = last_day_of_month(year, month);
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last_day))
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, last_day).unwrap_or_default())
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_month, next_year) = following_month(month, year);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_december_into_january() {
        assert_eq!(following_month(12, 2024), (1, 2025));
        assert_eq!(following_month(4, 2024), (5, 2024));
    }

    #[test]
    fn clamps_to_short_months() {
        assert_eq!(
            clamped_date(2025, 2, 31),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            clamped_date(2024, 2, 30),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            clamped_date(2024, 7, 31),
            NaiveDate::from_ymd_opt(2024, 7, 31).unwrap()
        );
    }
}
