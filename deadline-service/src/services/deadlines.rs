//! Deadline use-cases: calendar settings, seeding and the filing lifecycle.

use crate::models::{
    ClientRecord, ComplianceCalendarEntry, Deadline, FinancialYear, FirmCalendar,
};
use crate::services::generator::generate_deadlines;
use crate::services::metrics;
use crate::services::repository::{CalendarRepository, DeadlineRepository, UpsertSummary};
use chrono::{NaiveDate, Utc};
use service_core::error::AppError;
use service_core::middleware::{ActorRole, FirmContext};
use std::sync::Arc;
use validator::Validate;

#[derive(Clone)]
pub struct DeadlineService {
    deadlines: Arc<dyn DeadlineRepository>,
    calendars: Arc<dyn CalendarRepository>,
}

/// Result of seeding one client for one financial year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub financial_year: FinancialYear,
    pub generated: usize,
    pub summary: UpsertSummary,
}

impl DeadlineService {
    pub fn new(
        deadlines: Arc<dyn DeadlineRepository>,
        calendars: Arc<dyn CalendarRepository>,
    ) -> Self {
        Self {
            deadlines,
            calendars,
        }
    }

    /// The firm's stored calendar, or the statutory default when none is stored.
    pub async fn calendar_for(&self, firm_id: &str) -> Result<FirmCalendar, AppError> {
        match self.calendars.get(firm_id).await? {
            Some(calendar) => Ok(calendar),
            None => Ok(FirmCalendar::new(firm_id, FirmCalendar::default_entries())),
        }
    }

    pub async fn replace_calendar(
        &self,
        ctx: &FirmContext,
        entries: Vec<ComplianceCalendarEntry>,
    ) -> Result<FirmCalendar, AppError> {
        if ctx.role != ActorRole::FirmAdmin {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Only firm admins can change the compliance calendar"
            )));
        }
        if entries.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "A calendar needs at least one obligation"
            )));
        }
        for entry in &entries {
            entry.validate()?;
        }

        let calendar = FirmCalendar::new(ctx.firm_id.clone(), entries);
        self.calendars.put(&calendar).await?;
        tracing::info!(
            firm_id = %ctx.firm_id,
            entries = calendar.entries.len(),
            "Firm calendar replaced"
        );
        Ok(calendar)
    }

    /// Generate and persist a client's deadlines. Already stored deadlines are
    /// kept, so re-seeding never duplicates or resets a filing.
    pub async fn seed_client(
        &self,
        client: &ClientRecord,
        financial_year: Option<FinancialYear>,
    ) -> Result<SeedOutcome, AppError> {
        client.validate()?;
        let financial_year =
            financial_year.unwrap_or_else(|| FinancialYear::containing(Utc::now().date_naive()));

        let calendar = self.calendar_for(&client.firm_id).await?;
        let generated = generate_deadlines(client, &calendar.entries, financial_year);
        let summary = self.deadlines.upsert_many(&generated).await?;

        metrics::record_deadlines_seeded(generated.len(), summary.inserted);
        tracing::info!(
            firm_id = %client.firm_id,
            client_id = %client.client_id,
            financial_year = %financial_year,
            inserted = summary.inserted,
            existing = summary.existing,
            "Client deadlines seeded"
        );

        Ok(SeedOutcome {
            financial_year,
            generated: generated.len(),
            summary,
        })
    }

    /// Deadlines of a client with their status as seen on `today`.
    pub async fn list(
        &self,
        firm_id: &str,
        client_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<Deadline>, AppError> {
        let mut deadlines = self.deadlines.list_for_client(firm_id, client_id).await?;
        for deadline in deadlines.iter_mut() {
            deadline.status = deadline.effective_status(today);
        }
        Ok(deadlines)
    }

    pub async fn mark_filed(
        &self,
        ctx: &FirmContext,
        deadline_id: &str,
    ) -> Result<Deadline, AppError> {
        ctx.require_staff()?;

        let mut deadline = self
            .deadlines
            .get(&ctx.firm_id, deadline_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Deadline {} not found", deadline_id)))?;

        deadline.mark_filed(&ctx.user_id, Utc::now())?;
        self.deadlines.save_filing(&deadline).await?;

        metrics::record_deadline_filed(&deadline.obligation_type);
        tracing::info!(
            deadline_id = %deadline.id,
            client_id = %deadline.client_id,
            filed_by = %ctx.user_id,
            "Deadline marked as filed"
        );
        Ok(deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeadlineStatus;
    use crate::services::memory::{InMemoryCalendars, InMemoryDeadlines};
    use service_core::middleware::ActorRole;

    fn service() -> (DeadlineService, Arc<InMemoryDeadlines>) {
        let deadlines = Arc::new(InMemoryDeadlines::new());
        let service = DeadlineService::new(deadlines.clone(), Arc::new(InMemoryCalendars::new()));
        (service, deadlines)
    }

    fn client() -> ClientRecord {
        ClientRecord {
            client_id: "client-1".to_string(),
            firm_id: "firm-1".to_string(),
            assigned_ca_id: Some("ca-1".to_string()),
            onboarded_on: NaiveDate::from_ymd_opt(2024, 4, 15).unwrap(),
        }
    }

    fn staff() -> FirmContext {
        FirmContext::new("firm-1", "ca-1", ActorRole::Ca)
    }

    fn admin() -> FirmContext {
        FirmContext::new("firm-1", "partner-1", ActorRole::FirmAdmin)
    }

    #[tokio::test]
    async fn reseeding_keeps_existing_deadlines() {
        let (service, store) = service();
        let fy = Some(FinancialYear::new(2024));

        let first = service.seed_client(&client(), fy).await.unwrap();
        let second = service.seed_client(&client(), fy).await.unwrap();

        assert_eq!(first.summary.inserted, 37);
        assert_eq!(second.summary.inserted, 0);
        assert_eq!(second.summary.existing, 37);
        assert_eq!(store.len(), 37);
    }

    #[tokio::test]
    async fn reseeding_preserves_filing() {
        let (service, _) = service();
        let fy = Some(FinancialYear::new(2024));
        service.seed_client(&client(), fy).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let first = service.list("firm-1", "client-1", today).await.unwrap()[0].clone();
        service.mark_filed(&staff(), &first.id).await.unwrap();
        service.seed_client(&client(), fy).await.unwrap();

        let after = service.list("firm-1", "client-1", today).await.unwrap();
        let same = after.iter().find(|d| d.id == first.id).unwrap();
        assert_eq!(same.status, DeadlineStatus::Filed);
    }

    #[tokio::test]
    async fn clients_cannot_file() {
        let (service, _) = service();
        service
            .seed_client(&client(), Some(FinancialYear::new(2024)))
            .await
            .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let deadline = service.list("firm-1", "client-1", today).await.unwrap()[0].clone();

        let ctx = FirmContext::new("firm-1", "client-1", ActorRole::Client);
        let result = service.mark_filed(&ctx, &deadline.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn listing_reports_overdue_as_missed() {
        let (service, _) = service();
        service
            .seed_client(&client(), Some(FinancialYear::new(2024)))
            .await
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let deadlines = service.list("firm-1", "client-1", today).await.unwrap();
        let may_gstr1 = deadlines
            .iter()
            .find(|d| d.obligation_type == "GSTR-1" && d.period_month == 4)
            .unwrap();
        assert_eq!(may_gstr1.status, DeadlineStatus::Missed);

        let june_gstr3b = deadlines
            .iter()
            .find(|d| d.obligation_type == "GSTR-3B" && d.period_month == 5)
            .unwrap();
        assert_eq!(june_gstr3b.status, DeadlineStatus::Pending);
    }

    #[tokio::test]
    async fn custom_calendar_drives_generation() {
        let (service, _) = service();
        service
            .replace_calendar(&admin(), vec![ComplianceCalendarEntry::monthly("PF", 15)])
            .await
            .unwrap();

        let outcome = service
            .seed_client(&client(), Some(FinancialYear::new(2024)))
            .await
            .unwrap();
        assert_eq!(outcome.generated, 12);
    }

    #[tokio::test]
    async fn rejects_invalid_calendar_entries() {
        let (service, _) = service();
        let bad = ComplianceCalendarEntry {
            obligation_type: "Annual".to_string(),
            day_of_month: 10,
            month: None,
            recurring: false,
        };
        let result = service.replace_calendar(&admin(), vec![bad]).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn only_firm_admins_replace_the_calendar() {
        let (service, _) = service();
        let result = service
            .replace_calendar(&staff(), vec![ComplianceCalendarEntry::monthly("PF", 15)])
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let calendar = service.calendar_for("firm-1").await.unwrap();
        assert_eq!(calendar.entries, FirmCalendar::default_entries());
    }
}
