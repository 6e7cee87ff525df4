//! Site Settings Handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use errors::SummitError;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_state::AppState;
use crate::auth::SessionUser;
use crate::settings::{validate_setting, Settings};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub settings: Settings,
    pub css_vars: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateSettingResponse {
    pub key: String,
    pub value: String,
}

/// Resolved settings and the derived CSS variables
///
/// @route GET /api/settings
/// @output Json<SettingsResponse> - `{ settings: {key: value}, cssVars }`
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    _user: SessionUser,
) -> Json<SettingsResponse> {
    let settings = Settings::load(state.settings.as_ref()).await;
    let css_vars = settings.css_vars();
    Json(SettingsResponse { settings, css_vars })
}

/// Store one setting
///
/// @route PUT /api/settings/{key}
/// @input Json<UpdateSettingRequest> - `{ value }`
/// @status 400 unknown key or invalid value
pub async fn update_setting(
    State(state): State<Arc<AppState>>,
    SessionUser(user): SessionUser,
    Path(key): Path<String>,
    payload: Result<Json<UpdateSettingRequest>, JsonRejection>,
) -> Result<Json<UpdateSettingResponse>, SummitError> {
    let Json(request) = payload.map_err(|e| SummitError::BadRequest(e.body_text()))?;
    validate_setting(&key, &request.value)?;

    state.settings.put_setting(&key, &request.value).await?;
    info!("Setting '{}' updated by {}", key, user.sub);

    Ok(Json(UpdateSettingResponse {
        key,
        value: request.value,
    }))
}
