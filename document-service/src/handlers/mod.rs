pub mod documents;
pub mod gaps;
pub mod health;

pub use documents::{
    delete_document, get_document, get_job, ignore_transaction, upload_documents,
    verify_document, MAX_FILE_BYTES,
};
pub use gaps::{get_gaps, reconcile};
pub use health::{health_check, metrics_endpoint, readiness_check};
