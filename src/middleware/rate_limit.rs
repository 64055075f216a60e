use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::AsyncCommands;

use crate::{
    config::Config,
    utils::{error_codes, error_to_api_response},
};

/// Fixed-window request counter per client IP, kept in Redis.
#[derive(Clone)]
pub struct RateLimiter {
    redis: Arc<redis::Client>,
    config: Arc<Config>,
}

/// Client IP from `x-real-ip`, then the first `x-forwarded-for` entry, then
/// the socket address.
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    let remote_ip = remote.map(|addr| addr.ip().to_string());
    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

impl RateLimiter {
    pub fn new(redis: redis::Client, config: Arc<Config>) -> Self {
        Self {
            redis: Arc::new(redis),
            config,
        }
    }

    // Returns the request count in the current window for `ip`.
    async fn hit(&self, ip: &str) -> redis::RedisResult<u32> {
        let key = format!("rate_limit:{}", ip);
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let count: u32 = conn.incr(&key, 1).await?;
        if count == 1 {
            let _: () = conn
                .expire(&key, self.config.rate_limit_window().as_secs() as i64)
                .await?;
        }
        Ok(count)
    }

    pub async fn check_rate_limit(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        let remote = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0);
        let ip = client_ip(req.headers(), remote);

        match self.hit(&ip).await {
            Ok(count) if count > self.config.rate_limit_requests => {
                tracing::warn!("Rate limit exceeded for {}", ip);
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    error_to_api_response::<()>(
                        error_codes::RATE_LIMIT,
                        format!(
                            "too many requests, retry in {} seconds",
                            self.config.rate_limit_window().as_secs()
                        ),
                    ),
                )
                    .into_response();
            }
            Ok(_) => {}
            // Requests are let through while Redis is unreachable.
            Err(e) => tracing::error!("Rate limiter unavailable: {}", e),
        }

        next.run(req).await
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_proxy_headers() {
        let remote: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(remote)), "10.0.0.9");
        assert_eq!(client_ip(&headers, None), "unknown");

        headers.insert("x-forwarded-for", HeaderValue::from_static(" 1.2.3.4, 5.6.7.8"));
        assert_eq!(client_ip(&headers, Some(remote)), "1.2.3.4");

        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(client_ip(&headers, Some(remote)), "9.9.9.9");
    }
}
