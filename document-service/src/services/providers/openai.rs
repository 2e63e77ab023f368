//! OpenAI chat completions in JSON mode.

use super::{http_client, ModelPort, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str =
    "You are a precise Indian tax-document analyst. Reply with a single JSON object and nothing else.";

pub struct OpenAiPort {
    api_key: String,
    client: Client,
}

impl OpenAiPort {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key: api_key.into(),
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl ModelPort for OpenAiPort {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn try_model(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.1,
        };

        tracing::debug!(model = %model, prompt_len = prompt.len(), "Sending request to OpenAI API");

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => ProviderError::RateLimited,
                404 => ProviderError::ModelNotFound(model.to_string()),
                _ => ProviderError::ApiError(format!("OpenAI API error {}: {}", status, error_text)),
            });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(ProviderError::ContentFiltered);
        }

        choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
