use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState, error::AppError, models::Identity, operations::admin, utils::success_to_api_response,
};

use super::model::UpdateUserRequest;

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let users = admin::list_users(state.store.as_ref(), &caller).await?;
    Ok((StatusCode::OK, success_to_api_response(users)))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    admin::set_user_disabled(state.store.as_ref(), &caller, user_id, req.disabled).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    admin::delete_user(state.store.as_ref(), &caller, user_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let recipes = admin::list_all_recipes(state.store.as_ref(), &caller).await?;
    Ok((StatusCode::OK, success_to_api_response(recipes)))
}

#[axum::debug_handler]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    admin::delete_recipe(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let comments = admin::list_recent_comments(state.store.as_ref(), &caller).await?;
    Ok((StatusCode::OK, success_to_api_response(comments)))
}

#[axum::debug_handler]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    admin::delete_comment(state.store.as_ref(), &caller, comment_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}
