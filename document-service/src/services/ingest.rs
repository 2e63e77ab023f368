//! Upload intake and per-job execution.

use crate::models::{IngestJob, JobFile, JobStatus};
use crate::services::pipeline::DocumentPipeline;
use crate::services::repository::JobRepository;
use crate::services::retry::with_backoff;
use crate::services::storage::{storage_key, Storage};
use chrono::Utc;
use service_core::error::AppError;
use service_core::middleware::{ActorRole, FirmContext};
use std::sync::Arc;
use std::time::Duration;

const STORAGE_RETRY_WINDOW: Duration = Duration::from_secs(30);

pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "image/bmp",
    "image/webp",
];

/// A file received over HTTP, not yet stored.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct IngestService {
    jobs: Arc<dyn JobRepository>,
    storage: Arc<dyn Storage>,
    pipeline: Arc<DocumentPipeline>,
}

impl IngestService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        storage: Arc<dyn Storage>,
        pipeline: Arc<DocumentPipeline>,
    ) -> Self {
        Self {
            jobs,
            storage,
            pipeline,
        }
    }

    /// Stores the bytes and records a pending job for them.
    pub async fn submit(
        &self,
        ctx: &FirmContext,
        client_id: &str,
        declared_category: Option<String>,
        files: Vec<IncomingFile>,
    ) -> Result<IngestJob, AppError> {
        if ctx.role == ActorRole::Client && ctx.user_id != client_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Clients can only upload their own documents"
            )));
        }
        if files.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("No files uploaded")));
        }
        if let Some(file) = files
            .iter()
            .find(|f| !SUPPORTED_MIME_TYPES.contains(&f.mime_type.as_str()))
        {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Unsupported file type {} for {}",
                file.mime_type,
                file.original_name
            )));
        }

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let key = storage_key(&ctx.firm_id, client_id, &file.original_name);
            let size = file.data.len() as i64;
            with_backoff("storage_upload", STORAGE_RETRY_WINDOW, || {
                self.storage.upload(&key, file.data.clone())
            })
            .await?;
            stored.push(JobFile::new(file.original_name, file.mime_type, key, size));
        }

        let job = IngestJob::new(
            ctx.firm_id.clone(),
            client_id.to_string(),
            ctx.user_id.clone(),
            declared_category.filter(|c| !c.trim().is_empty()),
            stored,
        );
        with_backoff("job_insert", STORAGE_RETRY_WINDOW, || self.jobs.insert(&job)).await?;

        tracing::info!(
            job_id = %job.id,
            client_id = %client_id,
            files = job.files.len(),
            "Ingest job created"
        );
        Ok(job)
    }

    /// Files run one after another; a failing file does not stop the rest.
    pub async fn run(&self, mut job: IngestJob) -> IngestJob {
        job.status = JobStatus::Processing;
        job.updated_at = Utc::now();
        self.save(&job).await;

        for index in 0..job.files.len() {
            let file = job.files[index].clone();
            match self.pipeline.process(&job, &file).await {
                Ok(document) => job.files[index].document_id = Some(document.id),
                Err(e) => {
                    tracing::warn!(
                        job_id = %job.id,
                        file = %file.original_name,
                        error = %e,
                        "File failed in ingest job"
                    );
                    job.files[index].error = Some(failure_reason(&e));
                    if let Err(e) = self.storage.delete(&file.storage_key).await {
                        tracing::warn!(key = %file.storage_key, error = %e, "Failed to remove stored upload");
                    }
                }
            }
        }

        job.finish(Utc::now());
        self.save(&job).await;
        tracing::info!(
            job_id = %job.id,
            status = job.status.as_str(),
            documents = job.document_ids.len(),
            "Ingest job finished"
        );
        job
    }

    pub async fn get_job(&self, ctx: &FirmContext, job_id: &str) -> Result<IngestJob, AppError> {
        let job = self
            .jobs
            .get(&ctx.firm_id, job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Job {} not found", job_id)))?;

        if ctx.role == ActorRole::Client && job.client_id != ctx.user_id {
            return Err(AppError::NotFound(anyhow::anyhow!("Job {} not found", job_id)));
        }
        Ok(job)
    }

    /// Marks a job that could not be run.
    pub async fn fail(&self, mut job: IngestJob, reason: &str) -> IngestJob {
        for file in job.files.iter_mut() {
            file.error.get_or_insert_with(|| reason.to_string());
        }
        job.finish(Utc::now());
        self.save(&job).await;
        job
    }

    async fn save(&self, job: &IngestJob) {
        let result = with_backoff("job_save", STORAGE_RETRY_WINDOW, || self.jobs.save(job)).await;
        if let Err(e) = result {
            tracing::error!(job_id = %job.id, error = %e, "Failed to persist job state");
        }
    }
}

fn failure_reason(error: &AppError) -> String {
    match error {
        AppError::UploadFailed(reason) => reason.clone(),
        other => other.to_string(),
    }
}
