//! Health Check API Handlers

#![allow(clippy::disallowed_methods)] // json! macro

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app_state::AppState;

/// Health check endpoint
///
/// Reports database reachability; the sheet is not contacted.
///
/// @route GET /health
/// @output Json<Value> - service status
/// @status 503 when the database does not answer
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let (status, database) = match state.records.ping().await {
        Ok(()) => (StatusCode::OK, "connected".to_string()),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("error: {}", e)),
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "healthy" } else { "degraded" },
            "service": state.config.service.name,
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
            "grid": state.reconciler.grid().describe(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}
