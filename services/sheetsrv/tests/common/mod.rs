//! Common test utilities and helpers

#![allow(dead_code)]
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use sheetsrv::{
    auth::Claims, config::SheetsrvConfig, routes::create_routes, AppState, MemoryGrid,
    MemoryStore, RecordStore, SettingsStore, SheetReconciler, SqliteStore,
};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const SYNC_SECRET: &str = "sheet-script-secret";
pub const SESSION_SECRET: &str = "session-signing-secret";

pub fn test_config() -> SheetsrvConfig {
    let mut config = SheetsrvConfig::default();
    config.grid.spreadsheet_id = "test-sheet".to_string();
    config.grid.access_token = Some("test-token".to_string());
    config.auth.sync_secret = SYNC_SECRET.to_string();
    config.auth.session_secret = SESSION_SECRET.to_string();
    config
}

/// Router over a SQLite file in a temp dir and an in-memory sheet
pub struct TestEnv {
    pub app: Router,
    pub store: Arc<SqliteStore>,
    pub grid: Arc<MemoryGrid>,
    pub state: Arc<AppState>,
    _dir: TempDir,
}

impl TestEnv {
    pub async fn new(grid: MemoryGrid) -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::open(dir.path().join("sheetsrv.db")).await.unwrap());
        let grid = Arc::new(grid);
        let state = build_state(store.clone(), store.clone(), grid.clone());

        Self {
            app: create_routes(state.clone()),
            store,
            grid,
            state,
            _dir: dir,
        }
    }
}

/// Router over the in-memory store, for counting store calls
pub fn memory_env(grid: MemoryGrid) -> (Router, Arc<MemoryStore>, Arc<MemoryGrid>) {
    let store = Arc::new(MemoryStore::new());
    let grid = Arc::new(grid);
    let state = build_state(store.clone(), store.clone(), grid.clone());
    (create_routes(state), store, grid)
}

fn build_state(
    records: Arc<dyn RecordStore>,
    settings: Arc<dyn SettingsStore>,
    grid: Arc<MemoryGrid>,
) -> Arc<AppState> {
    let reconciler = Arc::new(SheetReconciler::new(records.clone(), grid));
    Arc::new(AppState::new(
        Arc::new(test_config()),
        records,
        settings,
        reconciler,
    ))
}

/// Session token signed with the test secret
pub fn session_token() -> String {
    session_token_with(SESSION_SECRET, 3600)
}

pub fn session_token_with(secret: &str, exp_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: "dashboard-user".to_string(),
        email: Some("ops@summit.example".to_string()),
        exp: (now + exp_offset) as usize,
        iat: Some(now as usize),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Send a request and decode the JSON body
pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = if bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

/// A full A..M row; missing trailing cells are blank
pub fn sheet_row(cells: &[&str]) -> Vec<String> {
    let mut row: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
    row.resize(sheetsrv::mapping::COLUMN_COUNT, String::new());
    row
}
