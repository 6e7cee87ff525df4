//! Service Bootstrap and Initialization
//!
//! Configuration, logging, database and sheet client setup, plus the HTTP
//! server loop.

use std::path::Path;
use std::sync::Arc;

use common::service_bootstrap::{get_service_port, LoggingOptions, ServiceInfo};
use errors::{config_error, SummitResult};
use tracing::info;

use crate::app_state::AppState;
use crate::config::{SheetsrvConfig, DEFAULT_PORT};
use crate::grid::{GoogleSheetsClient, GridClient};
use crate::reconcile::SheetReconciler;
use crate::routes::create_routes;
use crate::store::SqliteStore;

pub fn create_service_info() -> ServiceInfo {
    ServiceInfo::new(
        "sheetsrv",
        "Sheet Reconciler - podcast outreach sync with Google Sheets",
        DEFAULT_PORT,
    )
    .with_version(env!("CARGO_PKG_VERSION"))
}

/// Load `.env`, then the layered configuration
pub fn load_configuration(path: Option<&Path>) -> SummitResult<SheetsrvConfig> {
    common::service_bootstrap::load_development_env();
    let mut config = SheetsrvConfig::load(path)?;
    config.service.port = get_service_port(config.service.port, &create_service_info());
    Ok(config)
}

/// Initialize logging and print the banner
pub fn init_environment(service_info: &ServiceInfo, config: &SheetsrvConfig) -> SummitResult<()> {
    let options = LoggingOptions {
        dir: config.logging.dir.clone(),
        level: config.logging.level.clone(),
        json: config.logging.json,
    };
    common::service_bootstrap::init_logging(service_info, &options)
        .map_err(|e| config_error!("Failed to initialize logging: {}", e))?;

    common::service_bootstrap::print_startup_banner(service_info);
    Ok(())
}

/// Open the store and the sheet client and wire the application state
pub async fn build_state(config: SheetsrvConfig) -> SummitResult<Arc<AppState>> {
    let store = Arc::new(SqliteStore::open(&config.database.path).await?);
    info!("Database ready: {}", config.database.path.display());

    let grid: Arc<dyn GridClient> = Arc::new(GoogleSheetsClient::from_config(&config.grid)?);
    info!("Sheet client ready: {}", grid.describe());

    let reconciler = Arc::new(SheetReconciler::new(store.clone(), grid));

    Ok(Arc::new(AppState::new(
        Arc::new(config),
        store.clone(),
        store,
        reconciler,
    )))
}

/// Serve the API until a shutdown signal arrives
pub async fn start_server(state: Arc<AppState>) -> SummitResult<()> {
    let addr = format!("{}:{}", state.config.service.host, state.config.service.port);
    let app = create_routes(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| config_error!("Failed to bind {}: {}", addr, e))?;
    info!("API: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await?;

    info!("Server stopped");
    Ok(())
}
