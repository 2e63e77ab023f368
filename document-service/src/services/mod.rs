pub mod classification;
pub mod database;
pub mod documents;
pub mod gaps;
pub mod ingest;
pub mod memory;
pub mod metrics;
pub mod pipeline;
pub mod providers;
pub mod repository;
pub mod retry;
pub mod spend;
pub mod storage;

pub use classification::{classify, Classification, UNCLASSIFIED};
pub use database::MongoDb;
pub use documents::DocumentService;
pub use gaps::{reconcile_documents, GapAnalyzer, GapReport, GapTransaction, GAP_TOLERANCE};
pub use ingest::{IncomingFile, IngestService, SUPPORTED_MIME_TYPES};
pub use memory::{InMemoryDocuments, InMemoryJobs};
pub use pipeline::{DocumentPipeline, TextExtractor};
pub use repository::{DocumentRepository, JobRepository};
pub use service_core::observability::{get_metrics, init_metrics};
pub use spend::{analyze_spend, categorize};
pub use storage::{LocalStorage, Storage};
