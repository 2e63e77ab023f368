//! Persistence ports for documents and ingest jobs.

use crate::models::{DocumentStatus, IngestJob, TransactionMatch, UploadedDocument};
use async_trait::async_trait;
use service_core::error::AppError;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, document: &UploadedDocument) -> Result<(), AppError>;

    async fn get(&self, firm_id: &str, document_id: &str)
        -> Result<Option<UploadedDocument>, AppError>;

    /// Every document of a client, oldest first.
    async fn list_for_client(
        &self,
        firm_id: &str,
        client_id: &str,
    ) -> Result<Vec<UploadedDocument>, AppError>;

    /// Persist the verification fields of `document`, but only while the
    /// stored status is still `expected`. `false` when another writer moved it.
    async fn save_verification(
        &self,
        document: &UploadedDocument,
        expected: DocumentStatus,
    ) -> Result<bool, AppError>;

    /// Mark one statement debit ignored. `false` when the document is missing,
    /// frozen, or has no debit at `index`.
    async fn ignore_transaction(
        &self,
        firm_id: &str,
        document_id: &str,
        index: usize,
    ) -> Result<bool, AppError>;

    /// Write reconcile results line by line. Ignored lines and L2-verified
    /// documents are left as stored. Returns the number of lines written.
    async fn apply_matches(
        &self,
        document_id: &str,
        matches: &[TransactionMatch],
    ) -> Result<usize, AppError>;

    /// `false` when nothing matched.
    async fn delete(&self, firm_id: &str, document_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: &IngestJob) -> Result<(), AppError>;

    async fn get(&self, firm_id: &str, job_id: &str) -> Result<Option<IngestJob>, AppError>;

    async fn save(&self, job: &IngestJob) -> Result<(), AppError>;
}
