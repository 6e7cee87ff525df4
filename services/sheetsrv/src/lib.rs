//! sheetsrv library exports for testing

pub mod api;
pub mod app_state;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod grid;
pub mod mapping;
pub mod reconcile;
pub mod record;
pub mod routes;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use app_state::AppState;
pub use config::SheetsrvConfig;
pub use errors::{SummitError, SummitResult};
pub use grid::{GoogleSheetsClient, GridClient, GridRow, MemoryGrid};
pub use reconcile::{ExportReport, IdUpdate, ImportReport, SheetReconciler, SyncOutcome};
pub use record::{PodcastRecord, ResponseStatus, StoredPodcast};
pub use settings::Settings;
pub use store::{MemoryStore, RecordStore, SettingsStore, SqliteStore};
