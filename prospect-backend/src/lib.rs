pub mod agent;
pub mod ai;
pub mod config;
pub mod controllers;
pub mod db;
pub mod models;

use std::sync::Arc;

use agent::PageFetcher;
use ai::CompletionBackend;
use config::Config;
use db::Database;

/// Shared handles every request handler can reach.
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub completion: Arc<dyn CompletionBackend>,
    pub fetcher: Arc<dyn PageFetcher>,
}
