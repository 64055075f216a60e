use std::net::SocketAddr;
use std::sync::Arc;

use recipebook::{
    AppState,
    ai::provider_from_config,
    config::Config,
    database::{MemoryStore, PgStore, Store},
    middleware::{RateLimiter, rate_limit},
    operations::account::ensure_admin_account,
    routes,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env().expect("Failed to load configuration"));

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(
            PgStore::connect(&config, url)
                .await
                .expect("Failed to connect to Postgres"),
        ),
        None => {
            tracing::warn!("DATABASE_URL is not set, data lives in memory and is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        match ensure_admin_account(store.as_ref(), email, password).await {
            Ok(admin) => tracing::info!("Admin account {} ready", admin.email),
            Err(e) => tracing::error!("Failed to seed admin account: {}", e),
        }
    }

    let state = AppState {
        store,
        config: config.clone(),
        ai: provider_from_config(&config),
    };

    let router = routes::router(state);

    let router = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            let limiter = Arc::new(RateLimiter::new(client, config.clone()));
            tracing::info!(
                "Rate limiting enabled: {} requests per {}s",
                config.rate_limit_requests,
                config.rate_limit_window_secs
            );
            router.layer(axum::middleware::from_fn_with_state(limiter, rate_limit))
        }
        None => {
            tracing::warn!("REDIS_URL is not set, rate limiting disabled");
            router
        }
    };

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding permissive CORS layer for development");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
