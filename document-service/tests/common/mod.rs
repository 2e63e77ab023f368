#![allow(dead_code)]

use async_trait::async_trait;
use document_service::config::WorkerConfig;
use document_service::extraction::DocumentAnalyzer;
use document_service::models::IngestJob;
use document_service::services::{
    InMemoryDocuments, InMemoryJobs, JobRepository, LocalStorage, TextExtractor,
};
use document_service::startup::{AppState, Components};
use service_core::error::AppError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const CORRUPT_MARKER: &str = "%CORRUPT";

/// Reads uploads as UTF-8 text. Files starting with [`CORRUPT_MARKER`] fail.
#[derive(Default)]
pub struct EchoOcr {
    delay: Duration,
    seen: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl EchoOcr {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for EchoOcr {
    async fn extract_text(&self, data: &[u8], _mime_type: &str) -> Result<String, AppError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let text = String::from_utf8_lossy(data).to_string();
        self.seen.lock().unwrap().push(text.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if text.starts_with(CORRUPT_MARKER) {
            return Err(AppError::upload_failed("Could not convert document: damaged PDF"));
        }
        Ok(text.trim().to_string())
    }
}

pub struct Harness {
    pub state: AppState,
    pub documents: Arc<InMemoryDocuments>,
    pub jobs: Arc<InMemoryJobs>,
    pub ocr: Arc<EchoOcr>,
    pub storage_dir: TempDir,
}

pub fn inline_worker() -> WorkerConfig {
    WorkerConfig {
        enabled: false,
        ..WorkerConfig::default()
    }
}

pub async fn harness(analyzer: DocumentAnalyzer, ocr: EchoOcr, worker: WorkerConfig) -> Harness {
    let storage_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(LocalStorage::new(storage_dir.path()).await.unwrap());
    let documents = Arc::new(InMemoryDocuments::new());
    let jobs = Arc::new(InMemoryJobs::new());
    let ocr = Arc::new(ocr);

    let state = AppState::assemble(
        Components {
            documents: documents.clone(),
            jobs: jobs.clone(),
            storage,
            ocr: ocr.clone(),
            analyzer: Arc::new(analyzer),
            db: None,
        },
        worker,
    );

    Harness {
        state,
        documents,
        jobs,
        ocr,
        storage_dir,
    }
}

pub async fn wait_for_job(jobs: &InMemoryJobs, firm_id: &str, job_id: &str) -> IngestJob {
    for _ in 0..200 {
        if let Some(job) = jobs.get(firm_id, job_id).await.unwrap() {
            if job.status.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {} did not finish", job_id);
}

/// Files under the storage root, recursively.
pub fn stored_files(dir: &TempDir) -> usize {
    fn count(path: &std::path::Path) -> usize {
        std::fs::read_dir(path)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| {
                        let p = e.path();
                        if p.is_dir() {
                            count(&p)
                        } else {
                            1
                        }
                    })
                    .sum()
            })
            .unwrap_or(0)
    }
    count(dir.path())
}
