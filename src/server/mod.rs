//! HTTP API server for the similarity and prompting engines.

pub mod routes;

use crate::config::ServerConfig;
use crate::dynamic::DynamicPromptService;
use crate::metrics::MetricsCollector;
use crate::templates::PromptTemplates;
use std::sync::{Arc, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state for the HTTP server.
pub struct AppState {
    pub config: ServerConfig,
    pub templates: PromptTemplates,
    pub prompts: DynamicPromptService,
    pub metrics: RwLock<MetricsCollector>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            templates: PromptTemplates::default(),
            prompts: DynamicPromptService::new(),
            metrics: RwLock::new(MetricsCollector::new()),
        }
    }
}

/// Build the full application: routes plus CORS and request tracing.
pub fn app(state: Arc<AppState>) -> axum::Router {
    routes::create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server.
pub async fn start(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.addr.clone();
    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
