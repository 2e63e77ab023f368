//! Firm-scoped compliance calendar templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// One obligation in a firm's calendar.
///
/// Recurring entries fire for every month of the financial year and fall due
/// on `day_of_month` of the following month. Non-recurring entries fire once,
/// in `month`, and fall due on `day_of_month` of that same month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_schedule"))]
pub struct ComplianceCalendarEntry {
    #[validate(length(min = 1, max = 64))]
    pub obligation_type: String,
    #[validate(range(min = 1, max = 31))]
    pub day_of_month: u32,
    #[validate(range(min = 1, max = 12))]
    #[serde(default)]
    pub month: Option<u32>,
    pub recurring: bool,
}

fn validate_schedule(entry: &ComplianceCalendarEntry) -> Result<(), ValidationError> {
    if !entry.recurring && entry.month.is_none() {
        let mut err = ValidationError::new("month_required");
        err.message = Some("non-recurring obligations need a fixed month".into());
        return Err(err);
    }
    Ok(())
}

impl ComplianceCalendarEntry {
    pub fn monthly(obligation_type: &str, day_of_month: u32) -> Self {
        Self {
            obligation_type: obligation_type.to_string(),
            day_of_month,
            month: None,
            recurring: true,
        }
    }

    pub fn annual(obligation_type: &str, day_of_month: u32, month: u32) -> Self {
        Self {
            obligation_type: obligation_type.to_string(),
            day_of_month,
            month: Some(month),
            recurring: false,
        }
    }
}

/// Stored calendar configuration of a firm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmCalendar {
    #[serde(rename = "_id")]
    pub firm_id: String,
    pub entries: Vec<ComplianceCalendarEntry>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl FirmCalendar {
    pub fn new(firm_id: impl Into<String>, entries: Vec<ComplianceCalendarEntry>) -> Self {
        Self {
            firm_id: firm_id.into(),
            entries,
            updated_at: Utc::now(),
        }
    }

    /// GST and TDS returns monthly, income-tax return once a year.
    pub fn default_entries() -> Vec<ComplianceCalendarEntry> {
        vec![
            ComplianceCalendarEntry::monthly("GSTR-1", 11),
            ComplianceCalendarEntry::monthly("GSTR-3B", 20),
            ComplianceCalendarEntry::monthly("TDS", 7),
            ComplianceCalendarEntry::annual("ITR Filing", 31, 7),
        ]
    }
}
