use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::DomainAllowList;
use crate::extractor::{ExtractOptions, Extractor};

// --- Modules ---
pub mod classifier;
pub mod config;
pub mod domains;
pub mod error;
pub mod extractor;
pub mod handlers;
pub mod mapper;
pub mod models;
pub mod orchestrator;
pub mod selector;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn Extractor>,
    pub config: Arc<Config>,
    pub domains: Arc<DomainAllowList>,
}

impl AppState {
    pub fn new(config: Config, extractor: Arc<dyn Extractor>) -> Self {
        let domains = DomainAllowList::new(&config.supported_domains);
        Self {
            extractor,
            config: Arc::new(config),
            domains: Arc::new(domains),
        }
    }

    /// Options for one extraction call; the request may override `enable_remote`.
    pub fn extract_options(&self, enable_remote: Option<bool>) -> ExtractOptions {
        ExtractOptions {
            enable_remote: enable_remote.unwrap_or(self.config.enable_remote),
            timeout: self.config.extraction_timeout(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/formats", get(handlers::list_formats))
        .route(
            "/download-link",
            get(handlers::download_link_query).post(handlers::download_link),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any))
        .with_state(state)
}
