//! Deterministic provider for tests and local runs without an API key.

use async_trait::async_trait;

use super::{LlmError, LlmProvider};

/// Answers with the first registered response whose key occurs in the
/// prompt, or with the default response.
#[derive(Debug, Default)]
pub struct FakeProvider {
    responses: Vec<(String, String)>,
    default_response: Option<String>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, prompt_contains: &str, response: &str) -> Self {
        self.responses
            .push((prompt_contains.to_string(), response.to_string()));
        self
    }

    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.responses
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, response)| response.clone())
            .or_else(|| self.default_response.clone())
            .ok_or_else(|| LlmError::RequestFailed(format!("no fake response for: {prompt}")))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
