use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    models::Identity,
    operations::account,
    utils::success_to_api_response,
};

use super::model::{LoginRequest, RegisterRequest, UpdateProfileRequest};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = account::register(
        state.store.as_ref(),
        &state.config,
        &req.email,
        &req.password,
        req.name,
    )
    .await?;
    Ok((StatusCode::CREATED, success_to_api_response(session)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session =
        account::login(state.store.as_ref(), &state.config, &req.email, &req.password).await?;
    Ok((StatusCode::OK, success_to_api_response(session)))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let user = account::current_user(state.store.as_ref(), &caller).await?;
    Ok((StatusCode::OK, success_to_api_response(user)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = account::update_profile(state.store.as_ref(), &caller, req.name).await?;
    Ok((StatusCode::OK, success_to_api_response(user)))
}

#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let profile = account::get_user_profile(state.store.as_ref(), user_id).await?;
    Ok((StatusCode::OK, success_to_api_response(profile)))
}
