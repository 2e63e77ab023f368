//! Scripted provider for tests and offline runs.

use super::{ModelPort, ProviderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued replies in order and records which models were asked.
/// An exhausted script answers `NotConfigured`.
pub struct ScriptedPort {
    name: String,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn fail(self, error: ProviderError) -> Self {
        self.push(Err(error));
        self
    }

    /// Models requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(&self, reply: Result<String, ProviderError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

#[async_trait]
impl ModelPort for ScriptedPort {
    fn provider(&self) -> &str {
        &self.name
    }

    async fn try_model(&self, model: &str, _prompt: &str) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(model.to_string());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(ProviderError::NotConfigured("script exhausted".to_string())))
    }
}
