//! In-memory store
//!
//! Mirrors the SQLite semantics (status check, update-miss, ordering) and
//! counts calls so tests can assert which operations ran.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use errors::{SummitError, SummitResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RecordStore, SettingsStore};
use crate::record::{PodcastRecord, ResponseStatus, StoredPodcast};

#[derive(Debug, Default)]
pub struct CallCounts {
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub upserts: AtomicUsize,
    pub lists: AtomicUsize,
}

impl CallCounts {
    /// Total calls of any kind
    pub fn total(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.upserts.load(Ordering::SeqCst)
            + self.lists.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, StoredPodcast>>,
    settings: RwLock<BTreeMap<String, String>>,
    fail_settings: AtomicBool,
    pub calls: CallCounts,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `load_settings` fail, as an unreachable database would
    pub fn fail_settings(&self) {
        self.fail_settings.store(true, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check(record: &PodcastRecord) -> SummitResult<()> {
        if !record.has_name() {
            return Err(SummitError::Database(
                "podcast_name must not be empty".to_string(),
            ));
        }
        if ResponseStatus::parse(&record.response_status).is_none() {
            return Err(SummitError::Database(format!(
                "CHECK constraint failed: response_status '{}'",
                record.response_status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &PodcastRecord) -> SummitResult<String> {
        self.calls.inserts.fetch_add(1, Ordering::SeqCst);
        Self::check(record)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        self.records.write().await.insert(
            id.clone(),
            StoredPodcast {
                id: id.clone(),
                record: record.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: &str, record: &PodcastRecord) -> SummitResult<()> {
        self.calls.updates.fetch_add(1, Ordering::SeqCst);
        Self::check(record)?;

        let mut records = self.records.write().await;
        let stored = records
            .get_mut(id)
            .ok_or_else(|| SummitError::RecordNotFound(id.to_string()))?;
        stored.record = record.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn upsert(&self, id: &str, record: &PodcastRecord) -> SummitResult<()> {
        self.calls.upserts.fetch_add(1, Ordering::SeqCst);
        Self::check(record)?;

        let now = Utc::now();
        let mut records = self.records.write().await;
        records
            .entry(id.to_string())
            .and_modify(|stored| {
                stored.record = record.clone();
                stored.updated_at = now;
            })
            .or_insert_with(|| StoredPodcast {
                id: id.to_string(),
                record: record.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }

    async fn list_by_name(&self) -> SummitResult<Vec<StoredPodcast>> {
        self.calls.lists.fetch_add(1, Ordering::SeqCst);

        let mut all: Vec<StoredPodcast> = self.records.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            a.record
                .podcast_name
                .as_bytes()
                .cmp(b.record.podcast_name.as_bytes())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(all)
    }

    async fn get(&self, id: &str) -> SummitResult<Option<StoredPodcast>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn ping(&self) -> SummitResult<()> {
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_settings(&self) -> SummitResult<Vec<(String, String)>> {
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(SummitError::Database("settings unavailable".to_string()));
        }
        Ok(self
            .settings
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn put_setting(&self, key: &str, value: &str) -> SummitResult<()> {
        self.settings
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
