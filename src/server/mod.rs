/*!
 * HTTP API of the reading app.
 *
 * Built on axum with permissive CORS, since the browser front end is served
 * from a different origin. Request bodies, audio uploads included, are capped
 * at the configured size.
 */

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::app_config::ServerConfig;

pub mod handlers;
pub mod types;

pub use handlers::AppState;

/// Build the API router
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/evaluate", post(handlers::evaluate))
        .route("/api/transcribe", post(handlers::transcribe))
        .route("/api/coach", post(handlers::coach))
        .route(
            "/api/assignments",
            post(handlers::create_assignment).get(handlers::list_assignments),
        )
        .route(
            "/api/assignments/:id",
            get(handlers::get_assignment).delete(handlers::delete_assignment),
        )
        .route(
            "/api/assignments/:id/submissions",
            post(handlers::submit_reading).get(handlers::list_submissions),
        )
        .route("/api/assignments/:id/summary", get(handlers::assignment_summary))
        .route("/api/students/:id/submissions", get(handlers::student_submissions))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on an already bound listener until the task is dropped
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app).await.context("API server error")
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(state: Arc<AppState>, config: &ServerConfig) -> Result<()> {
    let app = router(state, config.max_upload_bytes);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    info!("ReadTogether API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    info!("ReadTogether API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
