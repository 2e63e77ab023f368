//! In-process repositories for tests and local runs without MongoDB.

use crate::models::{Deadline, DeadlineKey, FirmCalendar};
use crate::services::repository::{CalendarRepository, DeadlineRepository, UpsertSummary};
use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryDeadlines {
    // Insertion order is kept so listings are stable.
    deadlines: Mutex<Vec<Deadline>>,
}

impl InMemoryDeadlines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Deadline>>, AppError> {
        self.deadlines
            .lock()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("deadline store poisoned")))
    }
}

#[async_trait]
impl DeadlineRepository for InMemoryDeadlines {
    async fn upsert_many(&self, deadlines: &[Deadline]) -> Result<UpsertSummary, AppError> {
        let mut stored = self.lock()?;
        let mut summary = UpsertSummary::default();

        for deadline in deadlines {
            let key: DeadlineKey = deadline.key();
            if stored.iter().any(|d| d.key() == key) {
                summary.existing += 1;
            } else {
                stored.push(deadline.clone());
                summary.inserted += 1;
            }
        }

        Ok(summary)
    }

    async fn list_for_client(
        &self,
        firm_id: &str,
        client_id: &str,
    ) -> Result<Vec<Deadline>, AppError> {
        let mut found: Vec<Deadline> = self
            .lock()?
            .iter()
            .filter(|d| d.firm_id == firm_id && d.client_id == client_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.obligation_type.cmp(&b.obligation_type))
        });
        Ok(found)
    }

    async fn get(&self, firm_id: &str, deadline_id: &str) -> Result<Option<Deadline>, AppError> {
        Ok(self
            .lock()?
            .iter()
            .find(|d| d.id == deadline_id && d.firm_id == firm_id)
            .cloned())
    }

    async fn save_filing(&self, deadline: &Deadline) -> Result<(), AppError> {
        let mut stored = self.lock()?;
        let existing = stored
            .iter_mut()
            .find(|d| d.id == deadline.id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Deadline {} not found", deadline.id)))?;

        existing.status = deadline.status;
        existing.filed_at = deadline.filed_at;
        existing.filed_by = deadline.filed_by.clone();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCalendars {
    calendars: Mutex<HashMap<String, FirmCalendar>>,
}

impl InMemoryCalendars {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CalendarRepository for InMemoryCalendars {
    async fn get(&self, firm_id: &str) -> Result<Option<FirmCalendar>, AppError> {
        let calendars = self
            .calendars
            .lock()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("calendar store poisoned")))?;
        Ok(calendars.get(firm_id).cloned())
    }

    async fn put(&self, calendar: &FirmCalendar) -> Result<(), AppError> {
        let mut calendars = self
            .calendars
            .lock()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("calendar store poisoned")))?;
        calendars.insert(calendar.firm_id.clone(), calendar.clone());
        Ok(())
    }
}
