use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    ai::{generate_recipe, suggest_recipes},
    error::AppError,
    models::Identity,
    utils::success_to_api_response,
};

use super::model::{GenerateRequest, SuggestRequest};

#[axum::debug_handler]
pub async fn generate(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Json(req): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    caller.ensure_active()?;
    let draft = generate_recipe(state.ai.as_deref(), &req.prompt).await?;
    Ok((StatusCode::OK, success_to_api_response(draft)))
}

#[axum::debug_handler]
pub async fn suggest(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Json(req): Json<SuggestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let suggestions = suggest_recipes(
        state.store.as_ref(),
        state.ai.as_deref(),
        &caller,
        req.ingredients.into_vec(),
        req.cuisine,
    )
    .await?;
    Ok((StatusCode::OK, success_to_api_response(suggestions)))
}
