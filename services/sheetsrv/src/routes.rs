//! API Route Configuration
//!
//! Central route definition for all sheetsrv endpoints

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::health_handlers::health_check;
use crate::api::settings_handlers::{get_settings, update_setting};
use crate::api::sync_handlers::{export_to_sheet, import_from_sheet, sync_from_sheet};
use crate::app_state::AppState;

/// Create all API routes with state
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Sheet synchronization
        .route("/api/sync/from-sheet", post(sync_from_sheet))
        .route("/api/sync/import-sheet", post(import_from_sheet))
        .route("/api/sync/to-sheet", post(export_to_sheet))
        // Site settings
        .route("/api/settings", get(get_settings))
        .route("/api/settings/{key}", put(update_setting))
        .layer(axum::middleware::from_fn(
            common::logging::http_request_logger,
        ))
        .with_state(state)
}
