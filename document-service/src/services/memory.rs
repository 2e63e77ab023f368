//! In-process repositories for tests and local runs without MongoDB.

use crate::models::{DocumentStatus, IngestJob, MatchStatus, TransactionMatch, UploadedDocument};
use crate::services::repository::{DocumentRepository, JobRepository};
use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use std::sync::{Mutex, MutexGuard};

fn poisoned(store: &str) -> AppError {
    AppError::InternalError(anyhow::anyhow!("{} store poisoned", store))
}

#[derive(Default)]
pub struct InMemoryDocuments {
    documents: Mutex<Vec<UploadedDocument>>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every stored document, in insertion order.
    pub fn snapshot(&self) -> Vec<UploadedDocument> {
        self.lock().map(|d| d.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<UploadedDocument>>, AppError> {
        self.documents.lock().map_err(|_| poisoned("document"))
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocuments {
    async fn insert(&self, document: &UploadedDocument) -> Result<(), AppError> {
        let mut stored = self.lock()?;
        if stored.iter().any(|d| d.id == document.id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Document {} already exists",
                document.id
            )));
        }
        stored.push(document.clone());
        Ok(())
    }

    async fn get(
        &self,
        firm_id: &str,
        document_id: &str,
    ) -> Result<Option<UploadedDocument>, AppError> {
        Ok(self
            .lock()?
            .iter()
            .find(|d| d.id == document_id && d.firm_id == firm_id)
            .cloned())
    }

    async fn list_for_client(
        &self,
        firm_id: &str,
        client_id: &str,
    ) -> Result<Vec<UploadedDocument>, AppError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|d| d.firm_id == firm_id && d.owner_client_id == client_id)
            .cloned()
            .collect())
    }

    async fn save_verification(
        &self,
        document: &UploadedDocument,
        expected: DocumentStatus,
    ) -> Result<bool, AppError> {
        let mut stored = self.lock()?;
        let Some(existing) = stored
            .iter_mut()
            .find(|d| d.id == document.id && d.firm_id == document.firm_id)
        else {
            return Ok(false);
        };
        if existing.status != expected {
            return Ok(false);
        }
        existing.status = document.status;
        existing.verified_l1_by = document.verified_l1_by.clone();
        existing.verified_l2_by = document.verified_l2_by.clone();
        existing.updated_at = document.updated_at;
        Ok(true)
    }

    async fn ignore_transaction(
        &self,
        firm_id: &str,
        document_id: &str,
        index: usize,
    ) -> Result<bool, AppError> {
        let mut stored = self.lock()?;
        let Some(existing) = stored
            .iter_mut()
            .find(|d| d.id == document_id && d.firm_id == firm_id)
        else {
            return Ok(false);
        };
        if existing.status == DocumentStatus::VerifiedL2 {
            return Ok(false);
        }
        let Some(line) = existing
            .transactions
            .as_mut()
            .and_then(|t| t.get_mut(index))
            .filter(|t| t.is_debit())
        else {
            return Ok(false);
        };
        line.match_status = MatchStatus::Ignored;
        line.matched_document_id = None;
        existing.updated_at = Utc::now();
        Ok(true)
    }

    async fn apply_matches(
        &self,
        document_id: &str,
        matches: &[TransactionMatch],
    ) -> Result<usize, AppError> {
        let mut stored = self.lock()?;
        let Some(existing) = stored.iter_mut().find(|d| d.id == document_id) else {
            return Ok(0);
        };
        if existing.status == DocumentStatus::VerifiedL2 {
            return Ok(0);
        }
        let Some(lines) = existing.transactions.as_mut() else {
            return Ok(0);
        };

        let mut written = 0;
        for m in matches {
            if let Some(line) = lines
                .get_mut(m.index)
                .filter(|l| l.match_status != MatchStatus::Ignored)
            {
                line.match_status = m.status;
                line.matched_document_id = m.matched_document_id.clone();
                written += 1;
            }
        }
        if written > 0 {
            existing.updated_at = Utc::now();
        }
        Ok(written)
    }

    async fn delete(&self, firm_id: &str, document_id: &str) -> Result<bool, AppError> {
        let mut stored = self.lock()?;
        let before = stored.len();
        stored.retain(|d| !(d.id == document_id && d.firm_id == firm_id));
        Ok(stored.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryJobs {
    jobs: Mutex<Vec<IngestJob>>,
}

impl InMemoryJobs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<IngestJob>>, AppError> {
        self.jobs.lock().map_err(|_| poisoned("job"))
    }
}

#[async_trait]
impl JobRepository for InMemoryJobs {
    async fn insert(&self, job: &IngestJob) -> Result<(), AppError> {
        self.lock()?.push(job.clone());
        Ok(())
    }

    async fn get(&self, firm_id: &str, job_id: &str) -> Result<Option<IngestJob>, AppError> {
        Ok(self
            .lock()?
            .iter()
            .find(|j| j.id == job_id && j.firm_id == firm_id)
            .cloned())
    }

    async fn save(&self, job: &IngestJob) -> Result<(), AppError> {
        let mut stored = self.lock()?;
        match stored.iter_mut().find(|j| j.id == job.id) {
            Some(existing) => *existing = job.clone(),
            None => stored.push(job.clone()),
        }
        Ok(())
    }
}
