use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};

// Larger bodies are not expected from the error envelope.
const MAX_LOGGED_BODY: usize = 16 * 1024;

/// Logs method, path and body of every 5xx response, then passes the
/// response on unchanged.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!("{} {} -> {} (body unreadable: {})", method, path, parts.status, e);
            parts.headers.remove(header::CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    tracing::error!(
        "{} {} -> {}: {}",
        method,
        path,
        parts.status,
        String::from_utf8_lossy(&bytes)
    );

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
