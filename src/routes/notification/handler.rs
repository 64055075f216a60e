use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState, error::AppError, models::Identity, operations::notification,
    utils::success_to_api_response,
};

use super::model::MarkReadRequest;

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = notification::list_notifications(state.store.as_ref(), &caller).await?;
    Ok((StatusCode::OK, success_to_api_response(notifications)))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(notification_id): Path<Uuid>,
    Json(req): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = notification::mark_notification_read(
        state.store.as_ref(),
        &caller,
        notification_id,
        req.read,
    )
    .await?;
    Ok((StatusCode::OK, success_to_api_response(updated)))
}
