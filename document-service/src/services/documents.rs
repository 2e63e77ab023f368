use crate::models::{UploadedDocument, VerificationAction};
use crate::services::repository::DocumentRepository;
use crate::services::storage::Storage;
use chrono::Utc;
use service_core::error::AppError;
use service_core::middleware::{ActorRole, FirmContext};
use std::sync::Arc;

#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    storage: Arc<dyn Storage>,
}

impl DocumentService {
    pub fn new(documents: Arc<dyn DocumentRepository>, storage: Arc<dyn Storage>) -> Self {
        Self { documents, storage }
    }

    /// Clients only see their own documents; anything else reads as missing.
    pub async fn get(&self, ctx: &FirmContext, document_id: &str) -> Result<UploadedDocument, AppError> {
        let document = self
            .documents
            .get(&ctx.firm_id, document_id)
            .await?
            .ok_or_else(|| not_found(document_id))?;

        if ctx.role == ActorRole::Client && document.owner_client_id != ctx.user_id {
            return Err(not_found(document_id));
        }
        Ok(document)
    }

    pub async fn delete(&self, ctx: &FirmContext, document_id: &str) -> Result<(), AppError> {
        if ctx.role != ActorRole::FirmAdmin {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Only firm admins can delete documents"
            )));
        }

        let document = self.get(ctx, document_id).await?;
        if !self.documents.delete(&ctx.firm_id, document_id).await? {
            return Err(not_found(document_id));
        }
        if let Err(e) = self.storage.delete(&document.storage_key).await {
            tracing::warn!(document_id = %document_id, error = %e, "Stored file was not removed");
        }

        tracing::info!(document_id = %document_id, deleted_by = %ctx.user_id, "Document deleted");
        Ok(())
    }

    pub async fn verify(
        &self,
        ctx: &FirmContext,
        document_id: &str,
        action: VerificationAction,
    ) -> Result<UploadedDocument, AppError> {
        let mut document = self.get(ctx, document_id).await?;
        let expected = document.status;
        document.apply_verification(action, ctx, Utc::now())?;
        if !self.documents.save_verification(&document, expected).await? {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Document {} changed while it was being verified",
                document_id
            )));
        }

        tracing::info!(
            document_id = %document_id,
            status = document.status.as_str(),
            actor = %ctx.user_id,
            "Document verification updated"
        );
        Ok(document)
    }

    pub async fn ignore_transaction(
        &self,
        ctx: &FirmContext,
        document_id: &str,
        index: usize,
    ) -> Result<UploadedDocument, AppError> {
        ctx.require_staff()?;
        let mut document = self.get(ctx, document_id).await?;
        document.ignore_transaction(index, Utc::now())?;
        if !self
            .documents
            .ignore_transaction(&ctx.firm_id, document_id, index)
            .await?
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Transaction {} on document {} can no longer be ignored",
                index,
                document_id
            )));
        }
        Ok(document)
    }
}

fn not_found(document_id: &str) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Document {} not found", document_id))
}
