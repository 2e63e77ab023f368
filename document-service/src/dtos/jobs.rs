use crate::models::{IngestJob, JobFile, JobStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JobFileResponse {
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub document_id: Option<String>,
    pub error: Option<String>,
}

impl From<JobFile> for JobFileResponse {
    fn from(file: JobFile) -> Self {
        Self {
            original_name: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
            document_id: file.document_id,
            error: file.error,
        }
    }
}

/// Pollable view of an ingest job.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: String,
    pub client_id: String,
    pub status: JobStatus,
    pub declared_category: Option<String>,
    pub files: Vec<JobFileResponse>,
    pub document_ids: Vec<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<IngestJob> for JobResponse {
    fn from(job: IngestJob) -> Self {
        Self {
            id: job.id,
            client_id: job.client_id,
            status: job.status,
            declared_category: job.declared_category,
            files: job.files.into_iter().map(JobFileResponse::from).collect(),
            document_ids: job.document_ids,
            error: job.error,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}
