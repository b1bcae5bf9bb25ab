//! contest-admin library - bulk CSV ingestion for contest teams and results
//!
//! Administrators upload a CSV per entity kind and session. Each upload is
//! parsed, validated row by row, and then persisted in one transaction.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;

use api::{AuthorizationGate, SqliteAdminGate};
use ingest::SessionLocks;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Decides who may upload
    pub gate: Arc<dyn AuthorizationGate>,
    /// Serializes persistence per session
    pub locks: SessionLocks,
    pub startup_time: Instant,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// State with the store-backed admin gate
    pub fn new(db: SqlitePool, max_upload_bytes: usize) -> Self {
        let gate = Arc::new(SqliteAdminGate::new(db.clone()));
        Self::with_gate(db, gate, max_upload_bytes)
    }

    pub fn with_gate(db: SqlitePool, gate: Arc<dyn AuthorizationGate>, max_upload_bytes: usize) -> Self {
        Self {
            db,
            gate,
            locks: SessionLocks::new(),
            startup_time: Instant::now(),
            max_upload_bytes,
        }
    }
}

/// Panic inside a handler: generic 500 instead of a dropped connection
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!(details = %details, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error", "details": details })),
    )
        .into_response()
}

/// Build application router
///
/// Upload routes sit behind the admin gate and the body size cap; listings
/// and health are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let admin = Router::new()
        .route("/api/admin/upload-csv/teams", post(api::upload_teams))
        .route("/api/admin/upload-csv/results", post(api::upload_results))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    let public = Router::new()
        .route("/api/sessions", get(api::get_sessions))
        .route("/api/teams", get(api::get_teams))
        .route("/api/results", get(api::get_results))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
