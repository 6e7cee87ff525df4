//! Sheet ↔ store reconciliation
//!
//! The identifier in column M is the only correlation key. A row without one
//! is new; a record whose identifier appears in no row is missing from the
//! sheet. Deletions are never propagated in either direction.

use std::collections::HashMap;
use std::sync::Arc;

use errors::SummitResult;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::grid::GridClient;
use crate::mapping::{record_to_row, row_identifier, row_to_record};
use crate::store::RecordStore;

/// Result of a single-row sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new record was inserted under this identifier
    Created(String),
    /// The record with this identifier was overwritten
    Updated(String),
    /// The row has no name; nothing was stored
    Skipped,
}

impl SyncOutcome {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Created(id) | Self::Updated(id) => Some(id),
            Self::Skipped => None,
        }
    }
}

/// A newly assigned identifier the sheet should write back to column M
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdUpdate {
    pub row_index: u32,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    /// Rows whose store write failed; they are logged and left for the next run
    pub failed: usize,
    pub id_updates: Vec<IdUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub updated: usize,
    pub added: usize,
}

pub struct SheetReconciler {
    store: Arc<dyn RecordStore>,
    grid: Arc<dyn GridClient>,
    /// Serializes bulk runs against this grid
    batch_lock: Mutex<()>,
}

impl SheetReconciler {
    pub fn new(store: Arc<dyn RecordStore>, grid: Arc<dyn GridClient>) -> Self {
        Self {
            store,
            grid,
            batch_lock: Mutex::new(()),
        }
    }

    pub fn grid(&self) -> &Arc<dyn GridClient> {
        &self.grid
    }

    /// Store one edited row
    ///
    /// `id_hint` wins over column M when both are present. A row with an
    /// identifier is always an update; if that identifier is unknown the
    /// store's `RecordNotFound` is returned and nothing is inserted.
    pub async fn sync_row<S: AsRef<str>>(
        &self,
        cells: &[S],
        id_hint: Option<&str>,
    ) -> SummitResult<SyncOutcome> {
        let record = row_to_record(cells);
        if !record.has_name() {
            debug!("Row without podcast name skipped");
            return Ok(SyncOutcome::Skipped);
        }

        let existing = id_hint
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| row_identifier(cells));

        match existing {
            Some(id) => {
                self.store.update(&id, &record).await?;
                debug!("Row synced into {} ({})", id, record.podcast_name);
                Ok(SyncOutcome::Updated(id))
            },
            None => {
                let id = self.store.insert(&record).await?;
                info!("New podcast {} from sheet ({})", id, record.podcast_name);
                Ok(SyncOutcome::Created(id))
            },
        }
    }

    /// Pull every sheet row into the store
    ///
    /// A failed read aborts before any write. Per-row store failures are
    /// counted in `failed` and the run continues.
    pub async fn import_all(&self) -> SummitResult<ImportReport> {
        let _batch = self.batch_lock.lock().await;

        let rows = self.grid.read_all().await?;
        info!("Importing {} rows from {}", rows.len(), self.grid.describe());

        let mut report = ImportReport::default();
        for row in rows {
            let record = row_to_record(&row.cells);
            if !record.has_name() {
                report.skipped += 1;
                continue;
            }

            let result = match row_identifier(&row.cells) {
                Some(id) => self.store.upsert(&id, &record).await,
                None => match self.store.insert(&record).await {
                    Ok(id) => {
                        report.id_updates.push(IdUpdate {
                            row_index: row.position,
                            id,
                        });
                        Ok(())
                    },
                    Err(e) => Err(e),
                },
            };

            match result {
                Ok(()) => report.imported += 1,
                Err(e) => {
                    warn!("Import of row {} failed: {}", row.position, e);
                    report.failed += 1;
                },
            }
        }

        info!(
            "Import finished: imported={}, skipped={}, failed={}, new ids={}",
            report.imported,
            report.skipped,
            report.failed,
            report.id_updates.len()
        );
        Ok(report)
    }

    /// Push every stored record to the sheet
    ///
    /// Records whose identifier is already in column M overwrite that row;
    /// the rest are appended. The first grid failure aborts the run.
    pub async fn export_all(&self) -> SummitResult<ExportReport> {
        let _batch = self.batch_lock.lock().await;

        let records = self.store.list_by_name().await?;
        let rows = self.grid.read_all().await?;

        // Later rows win when an identifier appears twice
        let positions: HashMap<String, u32> = rows
            .iter()
            .filter_map(|row| row_identifier(&row.cells).map(|id| (id, row.position)))
            .collect();

        info!(
            "Exporting {} records to {} ({} identified rows)",
            records.len(),
            self.grid.describe(),
            positions.len()
        );

        let mut report = ExportReport::default();
        for stored in &records {
            let cells = record_to_row(&stored.record, &stored.id);
            let written = match positions.get(&stored.id) {
                Some(&position) => self
                    .grid
                    .update_row(position, &cells)
                    .await
                    .map(|()| report.updated += 1),
                None => self
                    .grid
                    .append_row(&cells)
                    .await
                    .map(|()| report.added += 1),
            };

            if let Err(e) = written {
                error!(
                    "Export aborted at {}: {} (updated={}, added={})",
                    stored.id, e, report.updated, report.added
                );
                return Err(e);
            }
        }

        info!(
            "Export finished: updated={}, added={}",
            report.updated, report.added
        );
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::grid::MemoryGrid;
    use crate::record::PodcastRecord;
    use crate::store::MemoryStore;
    use std::sync::atomic::Ordering;

    fn setup(grid: MemoryGrid) -> (SheetReconciler, Arc<MemoryStore>, Arc<MemoryGrid>) {
        let store = Arc::new(MemoryStore::new());
        let grid = Arc::new(grid);
        let reconciler = SheetReconciler::new(store.clone(), grid.clone());
        (reconciler, store, grid)
    }

    #[tokio::test]
    async fn test_sync_row_without_name_touches_nothing() {
        let (reconciler, store, _) = setup(MemoryGrid::new());
        let outcome = reconciler.sync_row(&["  ", "Confirmed"], None).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert_eq!(store.calls.total(), 0);
    }

    #[tokio::test]
    async fn test_sync_row_hint_beats_column() {
        let (reconciler, store, _) = setup(MemoryGrid::new());
        let id = store.insert(&PodcastRecord::named("Old")).await.unwrap();

        let mut cells = vec![""; 13];
        cells[0] = "New";
        cells[12] = "stale-id";
        let outcome = reconciler.sync_row(&cells, Some(&id)).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Updated(id.clone()));
        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.record.podcast_name, "New");
    }

    #[tokio::test]
    async fn test_import_rejects_nothing_on_read_failure() {
        let (reconciler, store, grid) = setup(MemoryGrid::with_rows([vec!["A"]]));
        grid.fail_reads();

        assert!(reconciler.import_all().await.is_err());
        assert_eq!(store.calls.total(), 0);
    }

    #[tokio::test]
    async fn test_import_counts_store_failures() {
        let (reconciler, store, _) = setup(MemoryGrid::with_rows([
            vec!["Good"],
            vec!["Bad", "Not A Status"],
            vec![""],
        ]));

        let report = reconciler.import_all().await.unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.id_updates.len(), 1);
        assert_eq!(report.id_updates[0].row_index, 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_export_duplicate_identifier_last_row_wins() {
        let (reconciler, store, grid) = setup(MemoryGrid::new());
        let id = store.insert(&PodcastRecord::named("Canonical")).await.unwrap();

        for name in ["First", "Second"] {
            let mut row = vec![String::new(); 13];
            row[0] = name.to_string();
            row[12] = id.clone();
            grid.append_row(&row).await.unwrap();
        }

        let report = reconciler.export_all().await.unwrap();
        assert_eq!(report, ExportReport { updated: 1, added: 0 });
        assert_eq!(grid.row(2).await.unwrap()[0], "First");
        assert_eq!(grid.row(3).await.unwrap()[0], "Canonical");
        assert_eq!(grid.row(3).await.unwrap()[12], id);
        // Only the two rows appended above
        assert_eq!(grid.append_count(), 2);
        assert_eq!(grid.update_count(), 1);
        assert_eq!(store.calls.lists.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_export_aborts_on_grid_failure() {
        let (reconciler, store, grid) = setup(MemoryGrid::new());
        for name in ["A", "B", "C"] {
            store.insert(&PodcastRecord::named(name)).await.unwrap();
        }
        grid.fail_writes_after(1);

        assert!(reconciler.export_all().await.is_err());
        assert_eq!(grid.data_row_count().await, 1);
        assert_eq!(grid.row(2).await.unwrap()[0], "A");
    }
}
