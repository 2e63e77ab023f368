//! Persistence ports for deadlines and firm calendars.

use crate::models::{Deadline, FirmCalendar};
use async_trait::async_trait;
use service_core::error::AppError;

/// Outcome of a bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub existing: usize,
}

#[async_trait]
pub trait DeadlineRepository: Send + Sync {
    /// Insert deadlines whose `(client, obligation, period)` key is new.
    /// Existing deadlines, filed or not, are left as they are.
    async fn upsert_many(&self, deadlines: &[Deadline]) -> Result<UpsertSummary, AppError>;

    async fn list_for_client(
        &self,
        firm_id: &str,
        client_id: &str,
    ) -> Result<Vec<Deadline>, AppError>;

    async fn get(&self, firm_id: &str, deadline_id: &str) -> Result<Option<Deadline>, AppError>;

    async fn save_filing(&self, deadline: &Deadline) -> Result<(), AppError>;
}

#[async_trait]
pub trait CalendarRepository: Send + Sync {
    async fn get(&self, firm_id: &str) -> Result<Option<FirmCalendar>, AppError>;

    async fn put(&self, calendar: &FirmCalendar) -> Result<(), AppError>;
}
