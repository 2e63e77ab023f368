pub mod documents;
pub mod jobs;

pub use documents::{DocumentResponse, UploadForm, VerificationRequest};
pub use jobs::{JobFileResponse, JobResponse};
