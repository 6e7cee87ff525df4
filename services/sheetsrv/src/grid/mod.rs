//! Spreadsheet access
//!
//! Rows are addressed by their 1-based sheet position. Position 1 is the
//! header row and is never returned or written.

pub mod google;
pub mod memory;
pub mod token;

pub use google::GoogleSheetsClient;
pub use memory::MemoryGrid;

use async_trait::async_trait;
use errors::{SummitError, SummitResult};

/// First position holding data
pub const FIRST_DATA_ROW: u32 = 2;

/// One data row read from the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    /// 1-based sheet position
    pub position: u32,
    /// Cells from column A; trailing empty cells may be missing
    pub cells: Vec<String>,
}

/// Operations the reconciler needs from a sheet
#[async_trait]
pub trait GridClient: Send + Sync {
    /// Every data row, header excluded, in sheet order
    async fn read_all(&self) -> SummitResult<Vec<GridRow>>;

    /// Overwrite columns A..M of the row at `position`
    async fn update_row(&self, position: u32, cells: &[String]) -> SummitResult<()>;

    /// Insert a row after the last used row
    async fn append_row(&self, cells: &[String]) -> SummitResult<()>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Reject writes aimed at the header or before it
pub fn ensure_data_position(position: u32) -> SummitResult<()> {
    if position < FIRST_DATA_ROW {
        return Err(SummitError::InvalidPosition(position));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_position_rejected() {
        assert!(matches!(
            ensure_data_position(1),
            Err(SummitError::InvalidPosition(1))
        ));
        assert!(ensure_data_position(0).is_err());
        assert!(ensure_data_position(2).is_ok());
    }
}
