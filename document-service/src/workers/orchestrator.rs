use crate::config::WorkerConfig;
use crate::models::IngestJob;
use crate::services::IngestService;
use service_core::error::AppError;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

/// Background pool for ingest jobs. At most `worker_count` jobs run at once;
/// files inside a job stay sequential.
pub struct WorkerOrchestrator {
    config: WorkerConfig,
    ingest: IngestService,
    job_tx: mpsc::Sender<IngestJob>,
    job_rx: Mutex<Option<mpsc::Receiver<IngestJob>>>,
    shutdown_token: CancellationToken,
}

impl WorkerOrchestrator {
    pub fn new(config: WorkerConfig, ingest: IngestService) -> Self {
        let (job_tx, job_rx) = mpsc::channel(config.queue_size.max(1));

        Self {
            config,
            ingest,
            job_tx,
            job_rx: Mutex::new(Some(job_rx)),
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Spawns the job distributor. Later calls are no-ops.
    pub fn start(&self) {
        if !self.config.enabled {
            tracing::info!("Worker pool disabled by configuration, jobs run inline");
            return;
        }

        let job_rx = match self.job_rx.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        let Some(mut job_rx) = job_rx else {
            tracing::warn!("Worker pool already started");
            return;
        };

        let worker_count = self.config.worker_count.max(1);
        tracing::info!(worker_count, "Starting worker pool");

        let permits = Arc::new(Semaphore::new(worker_count));
        let shutdown = self.shutdown_token.clone();
        let ingest = self.ingest.clone();

        tokio::spawn(async move {
            loop {
                let permit = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    permit = permits.clone().acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                let job = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    job = job_rx.recv() => match job {
                        Some(job) => job,
                        None => {
                            tracing::info!("Channel closed, job distributor exiting");
                            break;
                        }
                    },
                };

                tracing::info!(job_id = %job.id, files = job.files.len(), "Dispatching ingest job");
                let ingest = ingest.clone();
                tokio::spawn(async move {
                    ingest.run(job).await;
                    drop(permit);
                });
            }
            tracing::info!("Job distributor shutting down");
        });
    }

    /// Queues the job, or runs it to completion when the pool is disabled.
    /// Returns the job as the caller should see it.
    pub async fn dispatch(&self, job: IngestJob) -> Result<IngestJob, AppError> {
        if !self.config.enabled {
            return Ok(self.ingest.run(job).await);
        }

        match self.job_tx.try_send(job.clone()) {
            Ok(()) => Ok(job),
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Ingest queue rejected job");
                self.ingest.fail(job, "Processing queue is full").await;
                Err(AppError::ServiceUnavailable)
            }
        }
    }

    pub fn shutdown(&self) {
        tracing::info!("Initiating worker pool shutdown");
        self.shutdown_token.cancel();
    }
}
