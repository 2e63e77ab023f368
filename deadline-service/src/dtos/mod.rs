use crate::models::{ComplianceCalendarEntry, Deadline, DeadlineStatus, FirmCalendar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SeedDeadlinesRequest {
    #[serde(default)]
    pub assigned_ca_id: Option<String>,
    pub onboarded_on: NaiveDate,
    /// First calendar year of the financial year; defaults to the current one.
    #[validate(range(min = 2000, max = 2100))]
    #[serde(default)]
    pub financial_year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SeedDeadlinesResponse {
    pub financial_year: String,
    pub generated: usize,
    pub inserted: usize,
    pub existing: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeadlineResponse {
    pub id: String,
    pub client_id: String,
    pub assigned_ca_id: Option<String>,
    pub obligation_type: String,
    pub period_month: i32,
    pub period_year: i32,
    pub due_date: NaiveDate,
    pub status: DeadlineStatus,
    pub filed_at: Option<String>,
    pub filed_by: Option<String>,
    pub created_at: String,
}

impl From<Deadline> for DeadlineResponse {
    fn from(deadline: Deadline) -> Self {
        Self {
            id: deadline.id,
            client_id: deadline.client_id,
            assigned_ca_id: deadline.assigned_ca_id,
            obligation_type: deadline.obligation_type,
            period_month: deadline.period_month,
            period_year: deadline.period_year,
            due_date: deadline.due_date,
            status: deadline.status,
            filed_at: deadline.filed_at.map(|at| at.to_rfc3339()),
            filed_by: deadline.filed_by,
            created_at: deadline.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalendarRequest {
    pub entries: Vec<ComplianceCalendarEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub firm_id: String,
    pub entries: Vec<ComplianceCalendarEntry>,
    pub updated_at: String,
}

impl From<FirmCalendar> for CalendarResponse {
    fn from(calendar: FirmCalendar) -> Self {
        Self {
            firm_id: calendar.firm_id,
            entries: calendar.entries,
            updated_at: calendar.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListDeadlinesParams {
    /// Evaluate overdue status as of this date instead of today.
    pub as_of: Option<NaiveDate>,
}
