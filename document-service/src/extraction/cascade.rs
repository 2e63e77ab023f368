//! Ordered, strictly sequential provider chain.

use crate::extraction::json::extract_json_object;
use crate::models::ExtractionSource;
use crate::services::metrics;
use crate::services::providers::ModelPort;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// How a stage's completions are turned into JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free text that may wrap the object in prose or a code fence.
    Embedded,
    /// Provider-enforced JSON; parsed as is.
    Native,
}

/// One provider and the models to try on it, in order.
pub struct ProviderStage {
    port: Arc<dyn ModelPort>,
    models: Vec<String>,
    source: ExtractionSource,
    format: ResponseFormat,
}

impl ProviderStage {
    pub fn new(
        port: Arc<dyn ModelPort>,
        models: Vec<String>,
        source: ExtractionSource,
        format: ResponseFormat,
    ) -> Self {
        Self {
            port,
            models,
            source,
            format,
        }
    }
}

#[derive(Default)]
pub struct ProviderChain {
    stages: Vec<ProviderStage>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: ProviderStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.iter().all(|s| s.models.is_empty())
    }

    /// First model answer that parses as `T`, with the stage that produced it.
    ///
    /// Models are tried one at a time; request errors and unparseable output
    /// are logged and the next model is tried. `None` once every model failed.
    pub async fn run<T: DeserializeOwned>(
        &self,
        task: &str,
        prompt: &str,
    ) -> Option<(T, ExtractionSource)> {
        for stage in &self.stages {
            let provider = stage.port.provider();

            for model in &stage.models {
                let text = match stage.port.try_model(model, prompt).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(
                            provider = %provider,
                            model = %model,
                            task = %task,
                            error = %e,
                            "Model request failed, trying next"
                        );
                        metrics::record_provider_failure(provider, e.kind());
                        continue;
                    }
                };

                match parse_response::<T>(&text, stage.format) {
                    Ok(parsed) => {
                        tracing::info!(
                            provider = %provider,
                            model = %model,
                            task = %task,
                            "Model response accepted"
                        );
                        return Some((parsed, stage.source));
                    }
                    Err(reason) => {
                        tracing::warn!(
                            provider = %provider,
                            model = %model,
                            task = %task,
                            reason = %reason,
                            response_len = text.len(),
                            "Unparseable model response, trying next"
                        );
                        metrics::record_provider_failure(provider, "malformed_json");
                    }
                }
            }
        }

        None
    }
}

fn parse_response<T: DeserializeOwned>(text: &str, format: ResponseFormat) -> Result<T, String> {
    let json = match format {
        ResponseFormat::Native => text.trim(),
        ResponseFormat::Embedded => {
            extract_json_object(text).ok_or_else(|| "no JSON object found".to_string())?
        }
    };
    serde_json::from_str(json).map_err(|e| e.to_string())
}
