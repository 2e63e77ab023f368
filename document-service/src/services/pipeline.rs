//! One uploaded file through OCR, analysis and classification into a stored
//! document.

use crate::extraction::DocumentAnalyzer;
use crate::models::{DocumentStatus, IngestJob, JobFile, UploadedDocument};
use crate::services::classification::classify;
use crate::services::metrics;
use crate::services::repository::DocumentRepository;
use crate::services::retry::with_backoff;
use crate::services::spend::analyze_spend;
use crate::services::storage::Storage;
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::{Duration, Instant};

const PERSIST_RETRY_WINDOW: Duration = Duration::from_secs(30);

/// Bytes to text. Any error is fatal to the upload.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, data: &[u8], mime_type: &str) -> Result<String, AppError>;
}

pub struct DocumentPipeline {
    ocr: Arc<dyn TextExtractor>,
    analyzer: Arc<DocumentAnalyzer>,
    storage: Arc<dyn Storage>,
    documents: Arc<dyn DocumentRepository>,
    timeout: Duration,
}

impl DocumentPipeline {
    pub fn new(
        ocr: Arc<dyn TextExtractor>,
        analyzer: Arc<DocumentAnalyzer>,
        storage: Arc<dyn Storage>,
        documents: Arc<dyn DocumentRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            ocr,
            analyzer,
            storage,
            documents,
            timeout,
        }
    }

    /// Runs every stage under the pipeline timeout and persists the result.
    /// OCR failure or timeout yields `UploadFailed` and stores nothing.
    pub async fn process(&self, job: &IngestJob, file: &JobFile) -> Result<UploadedDocument, AppError> {
        let started = Instant::now();

        let data = with_backoff("storage_download", PERSIST_RETRY_WINDOW, || {
            self.storage.download(&file.storage_key)
        })
        .await?;

        let document = match tokio::time::timeout(self.timeout, self.run_stages(job, file, data)).await {
            Ok(Ok(document)) => document,
            Ok(Err(e)) => {
                metrics::record_ingest("failed");
                return Err(e);
            }
            Err(_) => {
                metrics::record_ingest("failed");
                tracing::error!(
                    job_id = %job.id,
                    file = %file.original_name,
                    timeout_secs = self.timeout.as_secs(),
                    "Document pipeline timed out"
                );
                return Err(AppError::upload_failed(format!(
                    "Processing {} timed out after {} seconds",
                    file.original_name,
                    self.timeout.as_secs()
                )));
            }
        };

        with_backoff("document_insert", PERSIST_RETRY_WINDOW, || {
            self.documents.insert(&document)
        })
        .await?;

        metrics::record_pipeline_duration(started.elapsed());
        metrics::record_ingest(match document.status {
            DocumentStatus::Flagged => "flagged",
            _ => "processed",
        });
        tracing::info!(
            job_id = %job.id,
            document_id = %document.id,
            category = %document.category,
            status = document.status.as_str(),
            risk_level = %document.risk_level,
            source = document.extraction_source.as_str(),
            duration_ms = started.elapsed().as_millis(),
            "Document processed"
        );

        Ok(document)
    }

    async fn run_stages(
        &self,
        job: &IngestJob,
        file: &JobFile,
        data: Vec<u8>,
    ) -> Result<UploadedDocument, AppError> {
        let raw_text = self
            .ocr
            .extract_text(&data, &file.mime_type)
            .await
            .map_err(|e| {
                metrics::record_ocr_failure(&file.mime_type);
                tracing::error!(file = %file.original_name, error = %e, "Text extraction failed");
                match e {
                    AppError::UploadFailed(reason) => AppError::UploadFailed(reason),
                    other => AppError::upload_failed(format!("Text extraction failed: {}", other)),
                }
            })?;

        let analysis = self.analyzer.analyze(&raw_text).await;
        let classification = classify(&analysis, job.declared_category.as_deref());

        let mut document = UploadedDocument::new(
            job.firm_id.clone(),
            job.client_id.clone(),
            job.uploaded_by.clone(),
            file.original_name.clone(),
            file.mime_type.clone(),
            file.size,
            file.storage_key.clone(),
        );
        document.declared_category = job.declared_category.clone();
        document.category = classification.category;
        document.status = classification.status;
        document.document_type = analysis.document_type;
        document.extracted_fields = analysis.extracted_fields;
        document.compliance_flags = analysis.compliance_flags;
        document.risk_level = analysis.risk_level;
        document.suggested_action = analysis.suggested_action;
        document.extraction_source = analysis.source;

        if classification.attach_spend_analysis {
            let transactions = self.analyzer.extract_transactions(&raw_text).await;
            document.analysis_result = Some(analyze_spend(&transactions));
            document.transactions = Some(transactions);
        }

        document.raw_ocr_text = raw_text;
        Ok(document)
    }
}
