use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    Pending,
    InProgress,
    Filed,
    Missed,
}

impl DeadlineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlineStatus::Pending => "pending",
            DeadlineStatus::InProgress => "in_progress",
            DeadlineStatus::Filed => "filed",
            DeadlineStatus::Missed => "missed",
        }
    }
}

/// Natural key of a deadline: one per client, obligation and reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeadlineKey {
    pub client_id: String,
    pub obligation_type: String,
    pub period_month: i32,
    pub period_year: i32,
}

/// `Option<DateTime<Utc>>` stored as a BSON date, matching `created_at`.
mod optional_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(bson::DateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<bson::DateTime>::deserialize(deserializer)?.map(|d| d.to_chrono()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deadline {
    #[serde(rename = "_id")]
    pub id: String,
    pub firm_id: String,
    pub assigned_ca_id: Option<String>,
    pub client_id: String,
    pub obligation_type: String,
    pub period_month: i32,
    pub period_year: i32,
    pub due_date: NaiveDate,
    pub status: DeadlineStatus,
    #[serde(default, with = "optional_bson_datetime")]
    pub filed_at: Option<DateTime<Utc>>,
    pub filed_by: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Deadline {
    pub fn new(
        firm_id: String,
        assigned_ca_id: Option<String>,
        client_id: String,
        obligation_type: String,
        period_month: i32,
        period_year: i32,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            firm_id,
            assigned_ca_id,
            client_id,
            obligation_type,
            period_month,
            period_year,
            due_date,
            status: DeadlineStatus::Pending,
            filed_at: None,
            filed_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> DeadlineKey {
        DeadlineKey {
            client_id: self.client_id.clone(),
            obligation_type: self.obligation_type.clone(),
            period_month: self.period_month,
            period_year: self.period_year,
        }
    }

    /// The only mutation a deadline accepts after generation.
    pub fn mark_filed(&mut self, filed_by: &str, filed_at: DateTime<Utc>) -> Result<(), AppError> {
        match self.status {
            DeadlineStatus::Filed => Err(AppError::Conflict(anyhow::anyhow!(
                "{} for {:02}/{} is already filed",
                self.obligation_type,
                self.period_month,
                self.period_year
            ))),
            _ => {
                self.status = DeadlineStatus::Filed;
                self.filed_at = Some(filed_at);
                self.filed_by = Some(filed_by.to_string());
                Ok(())
            }
        }
    }

    /// Status as seen on `today`: open deadlines past their due date read as
    /// missed. The stored status is left untouched.
    pub fn effective_status(&self, today: NaiveDate) -> DeadlineStatus {
        match self.status {
            DeadlineStatus::Pending | DeadlineStatus::InProgress if today > self.due_date => {
                DeadlineStatus::Missed
            }
            status => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tds_deadline() -> Deadline {
        Deadline::new(
            "firm-1".to_string(),
            Some("ca-1".to_string()),
            "client-1".to_string(),
            "TDS".to_string(),
            12,
            2024,
            NaiveDate::from_ymd_opt(2025, 1, 7).unwrap(),
        )
    }

    #[test]
    fn marks_pending_deadline_as_filed() {
        let mut deadline = tds_deadline();
        let now = Utc::now();
        deadline.mark_filed("ca-1", now).unwrap();

        assert_eq!(deadline.status, DeadlineStatus::Filed);
        assert_eq!(deadline.filed_by.as_deref(), Some("ca-1"));
        assert_eq!(deadline.filed_at, Some(now));
    }

    #[test]
    fn filing_twice_is_a_conflict() {
        let mut deadline = tds_deadline();
        deadline.mark_filed("ca-1", Utc::now()).unwrap();
        let result = deadline.mark_filed("ca-2", Utc::now());

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(deadline.filed_by.as_deref(), Some("ca-1"));
    }

    #[test]
    fn overdue_pending_deadline_reads_as_missed() {
        let deadline = tds_deadline();
        let after = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let on_due = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();

        assert_eq!(deadline.effective_status(after), DeadlineStatus::Missed);
        assert_eq!(deadline.effective_status(on_due), DeadlineStatus::Pending);
        assert_eq!(deadline.status, DeadlineStatus::Pending);
    }

    #[test]
    fn filed_deadline_never_reads_as_missed() {
        let mut deadline = tds_deadline();
        deadline.mark_filed("ca-1", Utc::now()).unwrap();
        let much_later = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        assert_eq!(deadline.effective_status(much_later), DeadlineStatus::Filed);
    }

    #[test]
    fn filed_at_is_stored_as_bson_date() {
        use chrono::TimeZone;
        use mongodb::bson::{self, Bson};

        let mut deadline = tds_deadline();
        let at = Utc.with_ymd_and_hms(2025, 1, 5, 10, 30, 0).unwrap();
        deadline.mark_filed("ca-1", at).unwrap();

        let stored = bson::to_document(&deadline).unwrap();
        assert!(matches!(stored.get("filed_at"), Some(Bson::DateTime(_))));

        let loaded: Deadline = bson::from_document(stored).unwrap();
        assert_eq!(loaded.filed_at, Some(at));

        let mut unfiled = bson::to_document(&tds_deadline()).unwrap();
        unfiled.remove("filed_at");
        let loaded: Deadline = bson::from_document(unfiled).unwrap();
        assert_eq!(loaded.filed_at, None);
    }
}
