//! PromptForge HTTP server.
//!
//! Thin driver around the workflow engine: one route per pipeline operation,
//! permissive CORS for the frontend, and a single workflow run per process.

mod routes;

use axum::routing::{get, post};
use axum::Router;
use promptforge_core::{WorkflowEngine, WorkflowRun};
use promptforge_models::ProviderRegistry;
use routes::AppState;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let registry = Arc::new(ProviderRegistry::from_env());
    let state = Arc::new(AppState {
        engine: WorkflowEngine::new(registry),
        run: Mutex::new(WorkflowRun::new()),
    });

    let app = Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/workflow/start", post(routes::start_workflow))
        .route("/api/workflow/step/:step_id", post(routes::execute_step))
        .route("/api/workflow/status", get(routes::get_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("PROMPTFORGE_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    info!(addr = %addr, "Starting PromptForge server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
