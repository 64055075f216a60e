use std::sync::Arc;

use ai::LlmProvider;
use config::Config;
use database::Store;

pub mod access;
pub mod ai;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod operations;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    /// `None` when no AI provider is configured.
    pub ai: Option<Arc<dyn LlmProvider>>,
}
