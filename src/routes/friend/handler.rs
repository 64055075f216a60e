use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    models::Identity,
    operations::friend::{self, FriendTarget},
    utils::success_to_api_response,
};

use super::model::{FriendRequestBody, StatusQuery};

#[axum::debug_handler]
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let friends = friend::list_friends(state.store.as_ref(), &caller).await?;
    Ok((StatusCode::OK, success_to_api_response(friends)))
}

#[axum::debug_handler]
pub async fn send_request(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Json(body): Json<FriendRequestBody>,
) -> Result<impl IntoResponse, AppError> {
    let target = FriendTarget::try_from(body)?;
    let request = friend::send_friend_request(state.store.as_ref(), &caller, target).await?;
    Ok((StatusCode::CREATED, success_to_api_response(request)))
}

#[axum::debug_handler]
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(friend_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    friend::remove_friend(state.store.as_ref(), &caller, friend_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn incoming_requests(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let requests = friend::list_incoming_requests(state.store.as_ref(), &caller).await?;
    Ok((StatusCode::OK, success_to_api_response(requests)))
}

#[axum::debug_handler]
pub async fn status(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = friend::friend_status(state.store.as_ref(), &caller, query.user_id).await?;
    Ok((StatusCode::OK, success_to_api_response(status)))
}

#[axum::debug_handler]
pub async fn accept_request(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let edge = friend::accept_friend_request(state.store.as_ref(), &caller, request_id).await?;
    Ok((StatusCode::OK, success_to_api_response(edge)))
}

#[axum::debug_handler]
pub async fn decline_request(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    friend::decline_friend_request(state.store.as_ref(), &caller, request_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}
