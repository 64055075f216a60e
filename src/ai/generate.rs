use serde::Serialize;

use super::LlmProvider;
use super::parse::parse_generated_recipe;
use crate::error::{AppError, Result};

const SYSTEM_PROMPT: &str = "You are a recipe assistant. Given a short description or idea, \
respond with a JSON object only (no markdown, no code block) with exactly these keys:
- name: string (recipe title)
- ingredients: string[] (list of ingredients with quantities)
- instructions: string (full step-by-step instructions, can be multiple paragraphs)
- cuisineType: string (e.g. Italian, Mexican)
- prepTimeMinutes: number
- cookTimeMinutes: number";

/// An unsaved recipe draft produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub cuisine_type: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
}

pub async fn generate_recipe(
    provider: Option<&dyn LlmProvider>,
    prompt: &str,
) -> Result<GeneratedRecipe> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::InvalidArgument("prompt is required".into()));
    }
    let provider = provider.ok_or_else(|| {
        AppError::Unavailable("AI generation is not configured, set OPENAI_API_KEY".into())
    })?;

    let reply = provider.complete(SYSTEM_PROMPT, prompt).await?;
    parse_generated_recipe(&reply).ok_or_else(|| {
        tracing::warn!("Unparseable recipe from {}: {}", provider.provider_name(), reply);
        AppError::Upstream("AI returned invalid format".into())
    })
}
