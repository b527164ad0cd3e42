//! REST API and web dashboard
//!
//! Every handler goes through the shared [`PredictionPipeline`]; the model
//! is read-only, so requests need no locking around it.

pub mod cors;
pub mod dashboard;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::Result;
use crate::pipeline::PredictionPipeline;
use crate::telemetry::TelemetryCollector;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    pub telemetry: TelemetryCollector,
}

impl AppState {
    pub fn new(pipeline: Arc<PredictionPipeline>) -> Self {
        Self {
            pipeline,
            telemetry: TelemetryCollector::new(),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/dashboard", get(handlers::dashboard))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/export", post(handlers::export))
        .route("/info", get(handlers::model_info))
        .route("/ranges", get(handlers::ranges))
        .route("/categories", get(handlers::categories))
        .route("/example", get(handlers::example))
        .route("/stats", get(handlers::stats))
        .layer(middleware::from_fn(cors::cors_middleware))
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn run_server(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "prediction API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("prediction API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
