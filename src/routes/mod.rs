use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors, require_admin},
    utils::success_to_api_response,
};

pub mod admin;
pub mod ai;
pub mod friend;
pub mod notification;
pub mod recipe;
pub mod user;

async fn ping() -> impl IntoResponse {
    (StatusCode::OK, success_to_api_response("pong"))
}

/// Builds the full application router, nested under `api_base_uri`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/ping", get(ping))
        .route("/auth/register", post(user::register))
        .route("/auth/login", post(user::login))
        .route("/users/{id}/profile", get(user::profile));

    let protected_routes = Router::new()
        .route("/me", get(user::me))
        .route("/me/profile", patch(user::update_profile))
        // recipes
        .route(
            "/recipes",
            get(recipe::list_recipes).post(recipe::create_recipe),
        )
        .route("/recipes/public", get(recipe::public_feed))
        .route("/recipes/search", get(recipe::search))
        .route(
            "/recipes/{id}",
            get(recipe::get_recipe)
                .patch(recipe::update_recipe)
                .delete(recipe::delete_recipe),
        )
        .route(
            "/recipes/{id}/share",
            get(recipe::list_shares)
                .post(recipe::share_recipe)
                .delete(recipe::unshare_recipe),
        )
        .route(
            "/recipes/{id}/likes",
            get(recipe::like_status)
                .post(recipe::like)
                .delete(recipe::unlike),
        )
        .route(
            "/recipes/{id}/favorite",
            post(recipe::favorite).delete(recipe::unfavorite),
        )
        .route(
            "/recipes/{id}/comments",
            get(recipe::list_comments).post(recipe::add_comment),
        )
        .route(
            "/recipes/{id}/comments/{comment_id}",
            delete(recipe::delete_comment),
        )
        .route("/favorites", get(recipe::list_favorites))
        // social
        .route(
            "/friends",
            get(friend::list_friends).post(friend::send_request),
        )
        .route("/friends/{id}", delete(friend::remove_friend))
        .route("/friend-requests", get(friend::incoming_requests))
        .route("/friend-requests/status", get(friend::status))
        .route(
            "/friend-requests/{id}/accept",
            post(friend::accept_request),
        )
        .route(
            "/friend-requests/{id}/decline",
            post(friend::decline_request),
        )
        .route("/notifications", get(notification::list_notifications))
        .route("/notifications/{id}", patch(notification::mark_read))
        // ai
        .route("/ai/generate", post(ai::generate))
        .route("/ai/suggest", post(ai::suggest))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/{id}",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/admin/recipes", get(admin::list_recipes))
        .route("/admin/recipes/{id}", delete(admin::delete_recipe))
        .route("/admin/comments", get(admin::list_comments))
        .route("/admin/comments/{id}", delete(admin::delete_comment))
        .layer(axum::middleware::from_fn(require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes);

    // axum refuses to nest at the root, so an empty prefix merges instead.
    let base = state.config.api_base_uri.clone();
    let router = if base.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&base, api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
