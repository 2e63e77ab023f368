use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One uploaded file within a job, with its own outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    pub original_name: String,
    pub mime_type: String,
    pub storage_key: String,
    pub size: i64,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobFile {
    pub fn new(original_name: String, mime_type: String, storage_key: String, size: i64) -> Self {
        Self {
            original_name,
            mime_type,
            storage_key,
            size,
            document_id: None,
            error: None,
        }
    }
}

/// Pollable handle for an upload being processed in the background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestJob {
    #[serde(rename = "_id")]
    pub id: String,
    pub firm_id: String,
    pub client_id: String,
    pub uploaded_by: String,
    pub declared_category: Option<String>,
    pub status: JobStatus,
    pub files: Vec<JobFile>,
    pub document_ids: Vec<String>,
    pub error: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl IngestJob {
    pub fn new(
        firm_id: String,
        client_id: String,
        uploaded_by: String,
        declared_category: Option<String>,
        files: Vec<JobFile>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            firm_id,
            client_id,
            uploaded_by,
            declared_category,
            status: JobStatus::Pending,
            files,
            document_ids: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Settle the job from its per-file outcomes: failed only when no file
    /// produced a document.
    pub fn finish(&mut self, at: DateTime<Utc>) {
        self.document_ids = self
            .files
            .iter()
            .filter_map(|f| f.document_id.clone())
            .collect();

        let failures: Vec<String> = self
            .files
            .iter()
            .filter_map(|f| f.error.as_ref().map(|e| format!("{}: {}", f.original_name, e)))
            .collect();

        self.status = if self.document_ids.is_empty() && !self.files.is_empty() {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };
        self.error = if failures.is_empty() {
            None
        } else {
            Some(failures.join("; "))
        };
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(files: usize) -> IngestJob {
        let files = (0..files)
            .map(|i| {
                JobFile::new(
                    format!("file-{}.pdf", i),
                    "application/pdf".to_string(),
                    format!("key-{}", i),
                    10,
                )
            })
            .collect();
        IngestJob::new(
            "firm-1".to_string(),
            "client-1".to_string(),
            "client-1".to_string(),
            None,
            files,
        )
    }

    #[test]
    fn partial_success_completes_with_error_summary() {
        let mut job = job(2);
        job.files[0].document_id = Some("doc-1".to_string());
        job.files[1].error = Some("OCR failed".to_string());
        job.finish(Utc::now());

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.document_ids, vec!["doc-1".to_string()]);
        assert_eq!(job.error.as_deref(), Some("file-1.pdf: OCR failed"));
    }

    #[test]
    fn all_files_failing_fails_the_job() {
        let mut job = job(1);
        job.files[0].error = Some("Unsupported file type".to_string());
        job.finish(Utc::now());

        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.document_ids.is_empty());
    }
}
