use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    models::{Identity, NewRecipe, RecipePatch},
    operations::{engagement, recipe, sharing},
    utils::success_to_api_response,
};

use super::model::{
    CommentRequest, FeedQuery, ListRecipesQuery, SearchQuery, ShareRequest, UnshareQuery,
};

#[axum::debug_handler]
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Query(query): Query<ListRecipesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let recipes =
        recipe::list_my_recipes(state.store.as_ref(), &caller, query.status, query.shared).await?;
    Ok((StatusCode::OK, success_to_api_response(recipes)))
}

#[axum::debug_handler]
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Json(fields): Json<NewRecipe>,
) -> Result<impl IntoResponse, AppError> {
    let created = recipe::create_recipe(state.store.as_ref(), &caller, fields).await?;
    Ok((StatusCode::CREATED, success_to_api_response(created)))
}

#[axum::debug_handler]
pub async fn public_feed(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let recipes =
        recipe::list_public_feed(state.store.as_ref(), &caller, query.q, query.cuisine).await?;
    Ok((StatusCode::OK, success_to_api_response(recipes)))
}

#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let hits = recipe::search_recipes(state.store.as_ref(), &caller, query.into()).await?;
    Ok((StatusCode::OK, success_to_api_response(hits)))
}

#[axum::debug_handler]
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = recipe::get_recipe(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(detail)))
}

#[axum::debug_handler]
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
    Json(patch): Json<RecipePatch>,
) -> Result<impl IntoResponse, AppError> {
    let detail = recipe::update_recipe(state.store.as_ref(), &caller, recipe_id, patch).await?;
    Ok((StatusCode::OK, success_to_api_response(detail)))
}

#[axum::debug_handler]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    recipe::delete_recipe(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn list_shares(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let shares = sharing::list_shares(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(shares)))
}

#[axum::debug_handler]
pub async fn share_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
    Json(req): Json<ShareRequest>,
) -> Result<impl IntoResponse, AppError> {
    let share = sharing::grant_share(
        state.store.as_ref(),
        &caller,
        recipe_id,
        &req.shared_with_email,
        req.can_edit,
    )
    .await?;
    Ok((StatusCode::OK, success_to_api_response(share)))
}

#[axum::debug_handler]
pub async fn unshare_recipe(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
    Query(query): Query<UnshareQuery>,
) -> Result<impl IntoResponse, AppError> {
    sharing::revoke_share(state.store.as_ref(), &caller, recipe_id, query.user_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn like_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let status = engagement::like_status(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(status)))
}

#[axum::debug_handler]
pub async fn like(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let status = engagement::like_recipe(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(status)))
}

#[axum::debug_handler]
pub async fn unlike(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let status = engagement::unlike_recipe(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(status)))
}

#[axum::debug_handler]
pub async fn favorite(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    engagement::favorite_recipe(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn unfavorite(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    engagement::unfavorite_recipe(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}

#[axum::debug_handler]
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let recipes = engagement::list_favorites(state.store.as_ref(), &caller).await?;
    Ok((StatusCode::OK, success_to_api_response(recipes)))
}

#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let comments = engagement::list_comments(state.store.as_ref(), &caller, recipe_id).await?;
    Ok((StatusCode::OK, success_to_api_response(comments)))
}

#[axum::debug_handler]
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(recipe_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment =
        engagement::add_comment(state.store.as_ref(), &caller, recipe_id, &req.text).await?;
    Ok((StatusCode::CREATED, success_to_api_response(comment)))
}

#[axum::debug_handler]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path((recipe_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    engagement::delete_comment(state.store.as_ref(), &caller, recipe_id, comment_id).await?;
    Ok((StatusCode::OK, success_to_api_response(())))
}
