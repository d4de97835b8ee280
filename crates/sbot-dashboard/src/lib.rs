//! Read-only HTTP dashboard for the status record.
//!
//! Serves the index page and the raw persisted record. It never creates,
//! repairs or rewrites the record; that is the bot's job.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use sbot_core::config::Config;

/// Built-in page used when no dashboard file is deployed.
pub const DEFAULT_DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

/// Dashboard state shared across handlers
#[derive(Clone, Debug)]
pub struct DashboardState {
    pub status_file: PathBuf,
    pub index_file: PathBuf,
    pub static_dir: PathBuf,
}

impl DashboardState {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            status_file: cfg.status_file.clone(),
            index_file: cfg.dashboard_file.clone(),
            static_dir: cfg.dashboard_dir.join("static"),
        }
    }
}

/// Bind `addr` and serve until the task is dropped or the listener fails.
pub async fn serve(addr: SocketAddr, state: DashboardState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!("Dashboard running on {}", addr);
    tracing::info!("Status file: {}", state.status_file.display());

    axum::serve(listener, create_router(state))
        .await
        .context("Dashboard server error")?;
    Ok(())
}

pub fn create_router(state: DashboardState) -> Router {
    let static_dir = state.static_dir.clone();

    Router::new()
        .route("/", get(serve_index))
        .route("/status.json", get(serve_status))
        .route("/health", get(health_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn serve_index(State(state): State<DashboardState>) -> Html<String> {
    match tokio::fs::read_to_string(&state.index_file).await {
        Ok(content) => Html(content),
        Err(_) => Html(DEFAULT_DASHBOARD_HTML.to_string()),
    }
}

/// Serve the persisted record byte-for-byte, read fresh on every request.
async fn serve_status(State(state): State<DashboardState>) -> Response {
    match tokio::fs::read(&state.status_file).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "status not set yet"})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to read {}: {e}", state.status_file.display());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "could not read status"})),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "not found"})),
    )
}
