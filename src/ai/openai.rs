//! OpenAI-compatible chat completions provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{LlmError, LlmProvider};

const MAX_TOKENS: u32 = 800;

#[derive(Debug)]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// `timeout` bounds each whole request, body included.
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
            client,
        })
    }

    fn request_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::RequestFailed(format!(
                "no response within {}s",
                self.timeout.as_secs_f32()
            ))
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(e))?;

        if status != 200 {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::ApiError { status, message });
        }

        let response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;

        response
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| LlmError::ParseError("No message content in response".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
