//! Recipe drafting and suggestions backed by a language model.
//!
//! Nothing here touches recipe access rules: generation returns an unsaved
//! draft, and suggestions fall back to the caller's own and shared recipes.

mod fake;
mod generate;
mod openai;
mod parse;
mod suggest;

pub use fake::FakeProvider;
pub use generate::{GeneratedRecipe, generate_recipe};
pub use openai::OpenAiProvider;
pub use parse::{parse_generated_recipe, parse_recipe_names};
pub use suggest::{RecipeMatch, SuggestionSource, Suggestions, suggest_recipes};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// A chat-style text completion service.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}

/// The configured provider, or `None` when no API key is set.
pub fn provider_from_config(config: &Config) -> Option<Arc<dyn LlmProvider>> {
    let api_key = config.openai_api_key.clone()?;
    let provider = match OpenAiProvider::new(
        api_key,
        config.openai_model.clone(),
        config.openai_base_url.clone(),
        config.openai_timeout(),
    ) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!("AI provider disabled: {}", e);
            return None;
        }
    };
    tracing::info!(
        "AI provider {} enabled with model {}",
        provider.provider_name(),
        provider.model_name()
    );
    Some(Arc::new(provider))
}
