use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    AppState,
    error::AppError,
    models::Identity,
    utils::verify_token,
};

/// Resolves the caller from `Authorization: Bearer <jwt>` and stores the
/// [`Identity`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state)
            .await
            .map_err(|_| AppError::Unauthorized("missing or malformed bearer token".into()))?;

    let claims = verify_token(bearer.token(), &state.config)
        .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("invalid or expired token".into()))?;

    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("user no longer exists".into()))?;
    if user.disabled {
        return Err(AppError::Forbidden("account is disabled".into()));
    }

    tracing::debug!("Authenticated user {}", user.id);
    parts.extensions.insert(user.identity());
    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Rejects callers without the admin role. Must run after [`auth_middleware`].
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(|| AppError::Unauthorized("not authenticated".into()))?;
    if let Err(e) = identity.ensure_admin() {
        tracing::warn!("User {} denied admin access", identity.id);
        return Err(e);
    }
    Ok(next.run(request).await)
}
