//! HTTP front end for the document QA service.
//!
//! Exposes the service over four JSON endpoints:
//!
//! - `POST /api/search`: answer a question with source citations
//! - `GET /api/health`: liveness plus engine readiness
//! - `GET /api/status`: index health detail
//! - `POST /api/initialize`: (re)build the query engine
//!
//! Failures surface as structured JSON with an `error` field; a bad query
//! never takes the process down.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use ragdoc::RagService;

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RagService>,
}

/// Listen address configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 5000 }
    }
}

/// Build the API router with CORS and request tracing layers.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", post(search))
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/initialize", post(initialize))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until shutdown.
pub async fn run_server(service: Arc<RagService>, config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState { service };
    let app = app_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for ragdoc server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("ragdoc server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    question: String,
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    match state.service.ask(&request.question).await {
        Ok(answer) => {
            let sources: Vec<String> = answer.sources.iter().map(|c| c.short()).collect();
            (StatusCode::OK, Json(json!({ "answer": answer.text, "sources": sources })))
        }
        Err(e) => {
            error!(error = %e, "search failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
        }
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "system_ready": state.service.is_ready().await,
    }))
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let db = state.service.check_database().await;
    Json(json!({
        "database_exists": db.exists,
        "database_status": db.detail,
        "system_ready": state.service.is_ready().await,
    }))
}

async fn initialize(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.initialize().await {
        Ok(message) => (StatusCode::OK, Json(json!({ "success": true, "message": message }))),
        Err(e) => {
            error!(error = %e, "initialization failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}
