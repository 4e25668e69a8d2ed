//! Worksheet-oriented row store.
//!
//! A workbook is a set of named worksheets. Each worksheet maps a 1-based row
//! number to an ordered list of cell values; row 1 always holds the column
//! headers. Columns are 1-based as well, so `(row, col)` addresses read the
//! same way they would in a spreadsheet.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub mod memory;
pub mod postgres;
pub mod schema;

pub use self::memory::MemoryWorkbook;
pub use self::postgres::PgWorkbook;

/// Row number of the header row in every worksheet.
pub const HEADER_ROW: usize = 1;

#[derive(Debug)]
pub enum StoreError {
    Db(sqlx::Error),
    Migrate(sqlx::migrate::MigrateError),
    WorksheetNotFound(String),
    InvalidAddress { row: usize, col: usize },
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Db(e) => write!(f, "Row store database error: {e}"),
            StoreError::Migrate(e) => write!(f, "Row store migration error: {e}"),
            StoreError::WorksheetNotFound(title) => write!(f, "Worksheet not found: {title}"),
            StoreError::InvalidAddress { row, col } => {
                write!(f, "Invalid cell address: row {row}, column {col}")
            }
            StoreError::Unavailable(msg) => write!(f, "Row store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Db(e)
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migrate(e)
    }
}

/// Location of a matched cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// A data row keyed by its worksheet header.
pub type Record = HashMap<String, String>;

/// Backend operations every workbook implementation provides.
///
/// `find` never matches the header row. `update_cell`/`update_cells` write past
/// the current end of a row or worksheet by padding with empty cells.
/// `delete_row` shifts every later row up by one.
#[async_trait::async_trait]
pub trait RowStore: Send + Sync {
    async fn has_worksheet(&self, sheet: &str) -> Result<bool, StoreError>;

    /// Create the worksheet with the given header row if it does not exist yet.
    async fn create_worksheet(&self, sheet: &str, headers: &[&str]) -> Result<(), StoreError>;

    /// First data cell (row-major order) whose value equals `value` exactly,
    /// optionally restricted to one column.
    async fn find(
        &self,
        sheet: &str,
        value: &str,
        column: Option<usize>,
    ) -> Result<Option<CellRef>, StoreError>;

    /// Values of one row; an empty vector for rows that were never written.
    async fn row_values(&self, sheet: &str, row: usize) -> Result<Vec<String>, StoreError>;

    /// Every row of the worksheet, header included, in row order.
    async fn all_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError>;

    async fn update_cell(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError>;

    async fn update_cells(
        &self,
        sheet: &str,
        row: usize,
        cells: &[(usize, String)],
    ) -> Result<(), StoreError>;

    /// Append one row after the last row; returns its row number.
    async fn append_row(&self, sheet: &str, values: &[String]) -> Result<usize, StoreError>;

    /// Append several rows in order; returns how many were written.
    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<usize, StoreError>;

    async fn delete_row(&self, sheet: &str, row: usize) -> Result<(), StoreError>;
}

/// Handle to one worksheet of a workbook. Cheap to clone.
#[derive(Clone)]
pub struct Worksheet {
    store: Arc<dyn RowStore>,
    title: String,
}

impl fmt::Debug for Worksheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worksheet").field("title", &self.title).finish()
    }
}

impl Worksheet {
    /// Open an existing worksheet. Fails with `WorksheetNotFound` if it is missing.
    pub async fn open(store: Arc<dyn RowStore>, title: &str) -> Result<Self, StoreError> {
        if !store.has_worksheet(title).await? {
            return Err(StoreError::WorksheetNotFound(title.to_string()));
        }
        Ok(Self { store, title: title.to_string() })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub async fn headers(&self) -> Result<Vec<String>, StoreError> {
        self.store.row_values(&self.title, HEADER_ROW).await
    }

    pub async fn find(&self, value: &str, column: Option<usize>) -> Result<Option<CellRef>, StoreError> {
        self.store.find(&self.title, value, column).await
    }

    pub async fn row_values(&self, row: usize) -> Result<Vec<String>, StoreError> {
        self.store.row_values(&self.title, row).await
    }

    /// Data rows as header-keyed records, paired with their row numbers.
    /// Rows whose cells are all empty are skipped.
    pub async fn records(&self) -> Result<Vec<(usize, Record)>, StoreError> {
        let rows = self.store.all_rows(&self.title).await?;
        let mut iter = rows.into_iter();
        let headers = iter.next().unwrap_or_default();
        let records = iter
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(i, cells)| (i + HEADER_ROW + 1, zip_record(&headers, cells)))
            .collect();
        Ok(records)
    }

    pub async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        self.store.update_cell(&self.title, row, col, value).await
    }

    pub async fn update_cells(&self, row: usize, cells: &[(usize, String)]) -> Result<(), StoreError> {
        self.store.update_cells(&self.title, row, cells).await
    }

    pub async fn append_row(&self, values: &[String]) -> Result<usize, StoreError> {
        self.store.append_row(&self.title, values).await
    }

    pub async fn append_rows(&self, rows: &[Vec<String>]) -> Result<usize, StoreError> {
        self.store.append_rows(&self.title, rows).await
    }

    pub async fn delete_row(&self, row: usize) -> Result<(), StoreError> {
        self.store.delete_row(&self.title, row).await
    }
}

fn zip_record(headers: &[String], cells: Vec<String>) -> Record {
    let mut cells = cells.into_iter();
    headers
        .iter()
        .map(|h| (h.clone(), cells.next().unwrap_or_default()))
        .collect()
}

/// Reject addresses outside the 1-based grid.
pub(crate) fn check_address(row: usize, col: usize) -> Result<(), StoreError> {
    if row == 0 || col == 0 {
        return Err(StoreError::InvalidAddress { row, col });
    }
    Ok(())
}

/// Write `value` at 1-based `col`, padding the row with empty cells as needed.
pub(crate) fn set_cell(cells: &mut Vec<String>, col: usize, value: &str) {
    if cells.len() < col {
        cells.resize(col, String::new());
    }
    cells[col - 1] = value.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cell_pads_short_rows() {
        let mut cells = vec!["a".to_string()];
        set_cell(&mut cells, 3, "c");
        assert_eq!(cells, vec!["a", "", "c"]);
    }

    #[test]
    fn zip_record_fills_missing_cells_with_empty() {
        let headers = vec!["id".to_string(), "name".to_string(), "notes".to_string()];
        let record = zip_record(&headers, vec!["A1".to_string()]);
        assert_eq!(record["id"], "A1");
        assert_eq!(record["name"], "");
        assert_eq!(record["notes"], "");
    }

    #[test]
    fn zero_addresses_are_rejected() {
        assert!(check_address(0, 1).is_err());
        assert!(check_address(1, 0).is_err());
        assert!(check_address(1, 1).is_ok());
    }
}
