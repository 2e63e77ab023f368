use crate::config::{DocumentConfig, WorkerConfig};
use crate::extraction::DocumentAnalyzer;
use crate::handlers;
use crate::services::{
    DocumentPipeline, DocumentRepository, DocumentService, GapAnalyzer, IngestService,
    JobRepository, LocalStorage, MongoDb, Storage, TextExtractor,
};
use crate::workers::{OcrEngine, WorkerOrchestrator};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Whole multipart request, across every file of a bulk upload.
const MAX_REQUEST_BYTES: usize = 100 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
    pub ingest: IngestService,
    pub gaps: GapAnalyzer,
    pub orchestrator: Arc<WorkerOrchestrator>,
    /// Absent when running on in-memory repositories.
    pub db: Option<MongoDb>,
}

/// Ports the service is wired from.
pub struct Components {
    pub documents: Arc<dyn DocumentRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub storage: Arc<dyn Storage>,
    pub ocr: Arc<dyn TextExtractor>,
    pub analyzer: Arc<DocumentAnalyzer>,
    pub db: Option<MongoDb>,
}

impl AppState {
    /// Wires the services and starts the worker pool. Needs a Tokio runtime.
    pub fn assemble(components: Components, worker: WorkerConfig) -> Self {
        let pipeline = Arc::new(DocumentPipeline::new(
            components.ocr,
            components.analyzer,
            components.storage.clone(),
            components.documents.clone(),
            worker.pipeline_timeout(),
        ));
        let ingest = IngestService::new(components.jobs, components.storage.clone(), pipeline);

        let orchestrator = Arc::new(WorkerOrchestrator::new(worker, ingest.clone()));
        orchestrator.start();

        Self {
            documents: DocumentService::new(components.documents.clone(), components.storage),
            gaps: GapAnalyzer::new(components.documents),
            ingest,
            orchestrator,
            db: components.db,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/documents",
            post(handlers::upload_documents).layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES)),
        )
        .route("/jobs/:job_id", get(handlers::get_job))
        .route(
            "/documents/:document_id",
            get(handlers::get_document).delete(handlers::delete_document),
        )
        .route(
            "/documents/:document_id/verification",
            post(handlers::verify_document),
        )
        .route(
            "/documents/:document_id/transactions/:index/ignore",
            post(handlers::ignore_transaction),
        )
        .route("/clients/:client_id/gaps", get(handlers::get_gaps))
        .route("/clients/:client_id/reconcile", post(handlers::reconcile))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    app: Router,
    orchestrator: Arc<WorkerOrchestrator>,
}

impl Application {
    pub async fn build(config: DocumentConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(&config.storage.local_path)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to initialize local storage at {}: {}",
                        config.storage.local_path,
                        e
                    );
                    e
                })?,
        );

        let repo = Arc::new(db.clone());
        let state = AppState::assemble(
            Components {
                documents: repo.clone(),
                jobs: repo,
                storage,
                ocr: Arc::new(OcrEngine::new(&config.ocr)),
                analyzer: Arc::new(DocumentAnalyzer::from_config(&config.ai)),
                db: Some(db),
            },
            config.worker.clone(),
        );
        let orchestrator = state.orchestrator.clone();

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            worker_count = config.worker.worker_count,
            pipeline_timeout_secs = config.worker.pipeline_timeout_secs,
            "Listening on {}",
            port
        );

        Ok(Self {
            port,
            listener,
            app: router(state),
            orchestrator,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let result = axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await;
        self.orchestrator.shutdown();
        // In-flight jobs get a moment to persist their state.
        tokio::time::sleep(Duration::from_millis(500)).await;
        result
    }
}
