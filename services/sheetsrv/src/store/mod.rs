//! Relational store for podcast records and site settings

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use errors::SummitResult;

use crate::record::{PodcastRecord, StoredPodcast};

/// Podcast persistence used by the reconciler
///
/// Each call is atomic on its own; nothing spans calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record and return its generated identifier
    async fn insert(&self, record: &PodcastRecord) -> SummitResult<String>;

    /// Overwrite the business fields of an existing record
    ///
    /// Fails with `RecordNotFound` when no record has this identifier.
    async fn update(&self, id: &str, record: &PodcastRecord) -> SummitResult<()>;

    /// Insert under the given identifier, or overwrite if it exists
    async fn upsert(&self, id: &str, record: &PodcastRecord) -> SummitResult<()>;

    /// All records ordered by name, then identifier
    async fn list_by_name(&self) -> SummitResult<Vec<StoredPodcast>>;

    async fn get(&self, id: &str) -> SummitResult<Option<StoredPodcast>>;

    /// Cheap connectivity check for health reporting
    async fn ping(&self) -> SummitResult<()>;
}

/// `site_settings` key/value rows
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load_settings(&self) -> SummitResult<Vec<(String, String)>>;

    async fn put_setting(&self, key: &str, value: &str) -> SummitResult<()>;
}
