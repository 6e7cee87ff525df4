//! Sheet Synchronization Handlers
//!
//! Single-row pull triggered by the sheet script, plus the manual bulk
//! import and export actions of the dashboard.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use errors::SummitError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::app_state::AppState;
use crate::auth::{verify_sync_secret, SessionUser};
use crate::reconcile::{ExportReport, ImportReport, SyncOutcome};

/// Payload posted by the sheet script on edit
#[derive(Debug, Deserialize)]
pub struct FromSheetRequest {
    /// Anything but a string never matches
    pub secret: Option<Value>,
    /// Row cells from column A; numbers and booleans are accepted as text
    #[serde(default)]
    pub values: Vec<Value>,
    /// Identifier known to the script, overrides column M
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FromSheetResponse {
    Synced { id: String },
    Skipped { skipped: bool },
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pull one edited row into the store
///
/// @route POST /api/sync/from-sheet
/// @input Json<FromSheetRequest> - `{ secret, values, id? }`
/// @output `{ id }` when stored, `{ skipped: true }` when the row has no name
/// @status 401 secret mismatch, 404 identifier unknown, 500 store failure
pub async fn sync_from_sheet(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FromSheetRequest>, JsonRejection>,
) -> Result<Json<FromSheetResponse>, SummitError> {
    let Json(request) = payload.map_err(|e| SummitError::BadRequest(e.body_text()))?;

    // Nothing else runs until the secret matches
    let provided = request.secret.as_ref().and_then(Value::as_str);
    verify_sync_secret(&state.config.auth.sync_secret, provided)?;

    let cells: Vec<String> = request.values.iter().map(cell_text).collect();
    let outcome = state
        .reconciler
        .sync_row(&cells, request.id.as_deref())
        .await?;

    Ok(Json(match outcome {
        SyncOutcome::Created(id) | SyncOutcome::Updated(id) => FromSheetResponse::Synced { id },
        SyncOutcome::Skipped => FromSheetResponse::Skipped { skipped: true },
    }))
}

/// Import every sheet row
///
/// @route POST /api/sync/import-sheet
/// @output Json<ImportReport> - `{ imported, skipped, failed, idUpdates: [{ rowIndex, id }] }`
/// @status 401 no session, 502/504 sheet unreachable
pub async fn import_from_sheet(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
) -> Result<Json<ImportReport>, SummitError> {
    info!("Sheet import requested by {}", user.sub);
    let report = state.reconciler.import_all().await?;
    Ok(Json(report))
}

/// Export every stored record to the sheet
///
/// @route POST /api/sync/to-sheet
/// @output Json<ExportReport> - `{ updated, added }`
/// @status 401 no session, 500 store failure, 502/504 sheet failure
pub async fn export_to_sheet(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
) -> Result<Json<ExportReport>, SummitError> {
    info!("Sheet export requested by {}", user.sub);
    let report = state.reconciler.export_all().await?;
    Ok(Json(report))
}
