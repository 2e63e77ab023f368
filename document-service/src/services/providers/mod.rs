//! AI provider ports used by the extraction chain.
//!
//! Each provider is built once at startup and shared; the chain only sees the
//! [`ModelPort`] trait, so tests swap in [`mock::ScriptedPort`].

pub mod gemini;
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiPort;
pub use mock::ScriptedPort;
pub use openai::OpenAiPort;

/// Error type for provider operations. Never crosses the extraction boundary.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Empty response")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::ModelNotFound(_) => "model_not_found",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// One prompt in, raw completion text out.
#[async_trait]
pub trait ModelPort: Send + Sync {
    /// Provider name for logs and metrics.
    fn provider(&self) -> &str;

    async fn try_model(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;
}

pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e)))
}
