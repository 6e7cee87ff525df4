//! In-memory sheet
//!
//! Behaves like a sheet with a header row. Failures can be injected to
//! exercise the error paths of the reconciler.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use errors::{SummitError, SummitResult};
use tokio::sync::RwLock;

use super::{ensure_data_position, GridClient, GridRow, FIRST_DATA_ROW};
use crate::mapping::HEADER;

#[derive(Debug)]
pub struct MemoryGrid {
    /// Data rows; index 0 is position 2
    rows: RwLock<Vec<Vec<String>>>,
    fail_reads: AtomicBool,
    /// Writes left before every further write fails; `usize::MAX` disables
    writes_before_failure: AtomicUsize,
    updates: AtomicUsize,
    appends: AtomicUsize,
}

impl Default for MemoryGrid {
    fn default() -> Self {
        Self::from_data(Vec::new())
    }
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_data(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: RwLock::new(rows),
            fail_reads: AtomicBool::new(false),
            writes_before_failure: AtomicUsize::new(usize::MAX),
            updates: AtomicUsize::new(0),
            appends: AtomicUsize::new(0),
        }
    }

    /// Grid pre-filled with data rows starting at position 2
    pub fn with_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_data(
            rows.into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Make every `read_all` fail
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Let `count` writes succeed, then fail the rest
    pub fn fail_writes_after(&self, count: usize) {
        self.writes_before_failure.store(count, Ordering::SeqCst);
    }

    /// Header plus data rows, as a sheet would show them
    pub async fn snapshot(&self) -> Vec<Vec<String>> {
        let mut all = vec![HEADER.iter().map(|h| h.to_string()).collect()];
        all.extend(self.rows.read().await.iter().cloned());
        all
    }

    /// Data row at a sheet position
    pub async fn row(&self, position: u32) -> Option<Vec<String>> {
        let index = position.checked_sub(FIRST_DATA_ROW)? as usize;
        self.rows.read().await.get(index).cloned()
    }

    pub async fn data_row_count(&self) -> usize {
        self.rows.read().await.len()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    fn take_write_permit(&self) -> SummitResult<()> {
        let granted = self
            .writes_before_failure
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                usize::MAX => Some(usize::MAX),
                n => Some(n - 1),
            })
            .is_ok();

        if granted {
            Ok(())
        } else {
            Err(SummitError::GridApi {
                status: 503,
                message: "memory grid write failure".to_string(),
            })
        }
    }
}

#[async_trait]
impl GridClient for MemoryGrid {
    async fn read_all(&self) -> SummitResult<Vec<GridRow>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SummitError::GridApi {
                status: 503,
                message: "memory grid read failure".to_string(),
            });
        }

        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, cells)| GridRow {
                position: i as u32 + FIRST_DATA_ROW,
                cells: cells.clone(),
            })
            .collect())
    }

    async fn update_row(&self, position: u32, cells: &[String]) -> SummitResult<()> {
        ensure_data_position(position)?;

        let index = (position - FIRST_DATA_ROW) as usize;
        let mut rows = self.rows.write().await;
        // Only rows that exist can be overwritten
        let row = rows
            .get_mut(index)
            .ok_or(SummitError::InvalidPosition(position))?;
        self.take_write_permit()?;
        *row = cells.to_vec();
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn append_row(&self, cells: &[String]) -> SummitResult<()> {
        self.take_write_permit()?;

        self.rows.write().await.push(cells.to_vec());
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory grid".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_positions_start_after_header() {
        let grid = MemoryGrid::with_rows([vec!["A"], vec!["B"]]);
        let rows = grid.read_all().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, 2);
        assert_eq!(rows[1].position, 3);
        assert_eq!(rows[1].cells, vec!["B".to_string()]);
    }

    #[tokio::test]
    async fn test_update_never_touches_header() {
        let grid = MemoryGrid::with_rows([vec!["A"]]);
        let err = grid.update_row(1, &["X".to_string()]).await.unwrap_err();
        assert!(matches!(err, SummitError::InvalidPosition(1)));

        let snapshot = grid.snapshot().await;
        assert_eq!(snapshot[0][0], "Podcast Name");
        assert_eq!(grid.update_count(), 0);
    }

    #[tokio::test]
    async fn test_update_past_last_row_rejected() {
        let grid = MemoryGrid::with_rows([vec!["A"]]);
        let err = grid.update_row(3, &["X".to_string()]).await.unwrap_err();

        assert!(matches!(err, SummitError::InvalidPosition(3)));
        assert_eq!(grid.data_row_count().await, 1);
        assert_eq!(grid.row(2).await, Some(vec!["A".to_string()]));
        assert_eq!(grid.update_count(), 0);
    }

    #[tokio::test]
    async fn test_append_and_update() {
        let grid = MemoryGrid::new();
        grid.append_row(&["A".to_string()]).await.unwrap();
        grid.update_row(2, &["B".to_string()]).await.unwrap();

        assert_eq!(grid.row(2).await, Some(vec!["B".to_string()]));
        assert_eq!(grid.append_count(), 1);
        assert_eq!(grid.update_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let grid = MemoryGrid::new();
        grid.fail_writes_after(1);

        grid.append_row(&["A".to_string()]).await.unwrap();
        assert!(grid.append_row(&["B".to_string()]).await.is_err());
        assert_eq!(grid.data_row_count().await, 1);
    }
}
