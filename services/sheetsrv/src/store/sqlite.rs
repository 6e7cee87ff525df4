//! SQLite implementation of the stores

use async_trait::async_trait;
use chrono::Utc;
use common::sqlite::SqliteClient;
use errors::{SummitError, SummitResult};
use sqlx::sqlite::SqliteArguments;
use sqlx::query::Query;
use sqlx::Sqlite;
use tracing::debug;
use uuid::Uuid;

use super::{schema, RecordStore, SettingsStore};
use crate::record::{PodcastRecord, StoredPodcast};

const SELECT_COLUMNS: &str = "SELECT id, podcast_name, response_status, notes, client_notes, \
     rating, social_handle, monthly_listeners, rep, recording_format, location, \
     audience_niche, episode_url, created_at, updated_at FROM podcasts";

#[derive(Clone)]
pub struct SqliteStore {
    client: SqliteClient,
}

impl SqliteStore {
    pub fn new(client: SqliteClient) -> Self {
        Self { client }
    }

    /// Open the database file and create the schema if needed
    pub async fn open(path: impl AsRef<std::path::Path>) -> SummitResult<Self> {
        let client = SqliteClient::new(path)
            .await
            .map_err(|e| SummitError::Database(format!("Failed to open database: {}", e)))?;
        let store = Self::new(client);
        store.init_schema().await?;
        Ok(store)
    }

    pub async fn init_schema(&self) -> SummitResult<()> {
        self.client
            .apply_schema(&schema::ALL)
            .await
            .map_err(|e| SummitError::Database(format!("Failed to create schema: {}", e)))?;
        debug!("Schema ready at {}", self.client.path());
        Ok(())
    }

    pub fn client(&self) -> &SqliteClient {
        &self.client
    }
}

/// Bind the twelve business columns in table order
fn bind_record<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    record: &'q PodcastRecord,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&record.podcast_name)
        .bind(&record.response_status)
        .bind(&record.notes)
        .bind(&record.client_notes)
        .bind(record.rating)
        .bind(&record.social_handle)
        .bind(record.monthly_listeners)
        .bind(&record.rep)
        .bind(&record.recording_format)
        .bind(&record.location)
        .bind(&record.audience_niche)
        .bind(&record.episode_url)
}

const INSERT_SQL: &str = "INSERT INTO podcasts (podcast_name, response_status, notes, \
     client_notes, rating, social_handle, monthly_listeners, rep, recording_format, location, \
     audience_niche, episode_url, id, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const UPDATE_SQL: &str = "UPDATE podcasts SET podcast_name = ?, response_status = ?, notes = ?, \
     client_notes = ?, rating = ?, social_handle = ?, monthly_listeners = ?, rep = ?, \
     recording_format = ?, location = ?, audience_niche = ?, episode_url = ?, updated_at = ? \
     WHERE id = ?";

const UPSERT_SQL: &str = "INSERT INTO podcasts (podcast_name, response_status, notes, \
     client_notes, rating, social_handle, monthly_listeners, rep, recording_format, location, \
     audience_niche, episode_url, id, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
     ON CONFLICT(id) DO UPDATE SET podcast_name = excluded.podcast_name, \
     response_status = excluded.response_status, notes = excluded.notes, \
     client_notes = excluded.client_notes, rating = excluded.rating, \
     social_handle = excluded.social_handle, monthly_listeners = excluded.monthly_listeners, \
     rep = excluded.rep, recording_format = excluded.recording_format, \
     location = excluded.location, audience_niche = excluded.audience_niche, \
     episode_url = excluded.episode_url, updated_at = excluded.updated_at";

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, record: &PodcastRecord) -> SummitResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        bind_record(sqlx::query(INSERT_SQL), record)
            .bind(&id)
            .bind(now)
            .bind(now)
            .execute(self.client.pool())
            .await?;

        debug!("Inserted podcast {} ({})", id, record.podcast_name);
        Ok(id)
    }

    async fn update(&self, id: &str, record: &PodcastRecord) -> SummitResult<()> {
        let result = bind_record(sqlx::query(UPDATE_SQL), record)
            .bind(Utc::now())
            .bind(id)
            .execute(self.client.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(SummitError::RecordNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn upsert(&self, id: &str, record: &PodcastRecord) -> SummitResult<()> {
        let now = Utc::now();

        bind_record(sqlx::query(UPSERT_SQL), record)
            .bind(id)
            .bind(now)
            .bind(now)
            .execute(self.client.pool())
            .await?;
        Ok(())
    }

    async fn list_by_name(&self) -> SummitResult<Vec<StoredPodcast>> {
        let sql = format!(
            "{} ORDER BY podcast_name COLLATE BINARY ASC, id ASC",
            SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, StoredPodcast>(&sql)
            .fetch_all(self.client.pool())
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: &str) -> SummitResult<Option<StoredPodcast>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, StoredPodcast>(&sql)
            .bind(id)
            .fetch_optional(self.client.pool())
            .await?;
        Ok(row)
    }

    async fn ping(&self) -> SummitResult<()> {
        self.client
            .ping()
            .await
            .map_err(|e| SummitError::Database(e.to_string()))
    }
}

#[async_trait]
impl SettingsStore for SqliteStore {
    async fn load_settings(&self) -> SummitResult<Vec<(String, String)>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM site_settings ORDER BY key")
                .fetch_all(self.client.pool())
                .await?;
        Ok(rows)
    }

    async fn put_setting(&self, key: &str, value: &str) -> SummitResult<()> {
        sqlx::query(
            "INSERT INTO site_settings (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(self.client.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(temp_dir.path().join("test.db"))
            .await
            .unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (store, _dir) = create_test_store().await;
        let mut record = PodcastRecord::named("Soil Stories");
        record.rating = Some(4.5);
        record.monthly_listeners = Some(1200);

        let id = store.insert(&record).await.unwrap();
        assert!(Uuid::parse_str(&id).is_ok());

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.record, record);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let (store, _dir) = create_test_store().await;
        let err = store
            .update("no-such-id", &PodcastRecord::named("X"))
            .await
            .unwrap_err();

        assert!(matches!(err, SummitError::RecordNotFound(ref id) if id == "no-such-id"));
        assert!(store.list_by_name().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let (store, _dir) = create_test_store().await;
        let mut record = PodcastRecord::named("Roots Radio");
        record.notes = Some("first".to_string());
        let id = store.insert(&record).await.unwrap();

        let mut changed = PodcastRecord::named("Roots Radio");
        changed.response_status = "Confirmed".to_string();
        store.update(&id, &changed).await.unwrap();

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.record.response_status, "Confirmed");
        assert_eq!(stored.record.notes, None);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let (store, _dir) = create_test_store().await;
        store
            .upsert("fixed-id", &PodcastRecord::named("First"))
            .await
            .unwrap();
        store
            .upsert("fixed-id", &PodcastRecord::named("Second"))
            .await
            .unwrap();

        let all = store.list_by_name().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "fixed-id");
        assert_eq!(all[0].record.podcast_name, "Second");
    }

    #[tokio::test]
    async fn test_unknown_status_rejected() {
        let (store, _dir) = create_test_store().await;
        let mut record = PodcastRecord::named("X");
        record.response_status = "Maybe Later".to_string();

        let err = store.insert(&record).await.unwrap_err();
        assert!(err.is_store_error());
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_list_orders_by_binary_name() {
        let (store, _dir) = create_test_store().await;
        for name in ["beta", "Alpha", "alpha", "Beta"] {
            store.insert(&PodcastRecord::named(name)).await.unwrap();
        }

        let names: Vec<String> = store
            .list_by_name()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.record.podcast_name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta", "alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let (store, _dir) = create_test_store().await;
        store.put_setting("site_title", "Summit").await.unwrap();
        store.put_setting("site_title", "Summit 2026").await.unwrap();
        store.put_setting("color_sage", "#000000").await.unwrap();

        let rows = store.load_settings().await.unwrap();
        assert_eq!(
            rows,
            vec![
                ("color_sage".to_string(), "#000000".to_string()),
                ("site_title".to_string(), "Summit 2026".to_string()),
            ]
        );
    }
}
