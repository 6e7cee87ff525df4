//! Summit Ops basic library
//!
//! Provides basic functions shared by all services, including:
//! - logging functions and the HTTP access log middleware
//! - service bootstrap helpers
//! - SQLite client
//! - graceful shutdown

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod logging;
pub mod service_bootstrap;
pub mod shutdown;

// Re-export common dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;

// Pre-import common types
pub mod prelude {
    pub use crate::service_bootstrap::ServiceInfo;
    #[cfg(feature = "sqlite")]
    pub use crate::sqlite::SqliteClient;
}
