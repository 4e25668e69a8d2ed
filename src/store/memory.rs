use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::{check_address, set_cell, CellRef, RowStore, StoreError, HEADER_ROW};

/// In-process workbook. Used for demos (`UDAAN_STORE=memory`) and tests.
///
/// `set_available(false)` makes every call fail with `StoreError::Unavailable`,
/// which is how tests exercise the remote-failure paths.
#[derive(Default)]
pub struct MemoryWorkbook {
    sheets: RwLock<HashMap<String, Vec<Vec<String>>>>,
    offline: AtomicBool,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory workbook switched offline".to_string()));
        }
        Ok(())
    }

    fn read<T>(
        &self,
        sheet: &str,
        f: impl FnOnce(&Vec<Vec<String>>) -> T,
    ) -> Result<T, StoreError> {
        self.check_online()?;
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        let rows = sheets
            .get(sheet)
            .ok_or_else(|| StoreError::WorksheetNotFound(sheet.to_string()))?;
        Ok(f(rows))
    }

    fn write<T>(
        &self,
        sheet: &str,
        f: impl FnOnce(&mut Vec<Vec<String>>) -> T,
    ) -> Result<T, StoreError> {
        self.check_online()?;
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::WorksheetNotFound(sheet.to_string()))?;
        Ok(f(rows))
    }
}

fn row_mut(rows: &mut Vec<Vec<String>>, row: usize) -> &mut Vec<String> {
    if rows.len() < row {
        rows.resize(row, Vec::new());
    }
    &mut rows[row - 1]
}

#[async_trait::async_trait]
impl RowStore for MemoryWorkbook {
    async fn has_worksheet(&self, sheet: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        Ok(sheets.contains_key(sheet))
    }

    async fn create_worksheet(&self, sheet: &str, headers: &[&str]) -> Result<(), StoreError> {
        self.check_online()?;
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        sheets
            .entry(sheet.to_string())
            .or_insert_with(|| vec![headers.iter().map(|h| h.to_string()).collect()]);
        Ok(())
    }

    async fn find(
        &self,
        sheet: &str,
        value: &str,
        column: Option<usize>,
    ) -> Result<Option<CellRef>, StoreError> {
        self.read(sheet, |rows| {
            rows.iter()
                .enumerate()
                .skip(HEADER_ROW)
                .find_map(|(i, cells)| {
                    let hit = match column {
                        Some(col) => cells.get(col.wrapping_sub(1)).filter(|c| *c == value).map(|_| col),
                        None => cells.iter().position(|c| c == value).map(|p| p + 1),
                    };
                    hit.map(|col| CellRef { row: i + 1, col })
                })
        })
    }

    async fn row_values(&self, sheet: &str, row: usize) -> Result<Vec<String>, StoreError> {
        check_address(row, 1)?;
        self.read(sheet, |rows| rows.get(row - 1).cloned().unwrap_or_default())
    }

    async fn all_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        self.read(sheet, |rows| rows.clone())
    }

    async fn update_cell(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        check_address(row, col)?;
        self.write(sheet, |rows| set_cell(row_mut(rows, row), col, value))
    }

    async fn update_cells(
        &self,
        sheet: &str,
        row: usize,
        cells: &[(usize, String)],
    ) -> Result<(), StoreError> {
        for (col, _) in cells {
            check_address(row, *col)?;
        }
        self.write(sheet, |rows| {
            let target = row_mut(rows, row);
            for (col, value) in cells {
                set_cell(target, *col, value);
            }
        })
    }

    async fn append_row(&self, sheet: &str, values: &[String]) -> Result<usize, StoreError> {
        self.write(sheet, |rows| {
            rows.push(values.to_vec());
            rows.len()
        })
    }

    async fn append_rows(&self, sheet: &str, new_rows: &[Vec<String>]) -> Result<usize, StoreError> {
        self.write(sheet, |rows| {
            rows.extend(new_rows.iter().cloned());
            new_rows.len()
        })
    }

    async fn delete_row(&self, sheet: &str, row: usize) -> Result<(), StoreError> {
        check_address(row, 1)?;
        self.write(sheet, |rows| {
            if row <= rows.len() {
                rows.remove(row - 1);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn find_skips_header_and_reports_column() {
        let book = MemoryWorkbook::new();
        book.create_worksheet("S", &["id", "name"]).await.unwrap();
        book.append_row("S", &strings(&["name", "id"])).await.unwrap();

        let hit = book.find("S", "id", None).await.unwrap();
        assert_eq!(hit, Some(CellRef { row: 2, col: 2 }));
        assert_eq!(book.find("S", "id", Some(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_row_shifts_later_rows_up() {
        let book = MemoryWorkbook::new();
        book.create_worksheet("S", &["id"]).await.unwrap();
        for id in ["a", "b", "c"] {
            book.append_row("S", &strings(&[id])).await.unwrap();
        }
        book.delete_row("S", 3).await.unwrap();
        assert_eq!(book.row_values("S", 3).await.unwrap(), strings(&["c"]));
        assert_eq!(book.all_rows("S").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn offline_workbook_fails_every_call() {
        let book = MemoryWorkbook::new();
        book.create_worksheet("S", &["id"]).await.unwrap();
        book.set_available(false);
        assert!(matches!(book.all_rows("S").await, Err(StoreError::Unavailable(_))));
        book.set_available(true);
        assert!(book.all_rows("S").await.is_ok());
    }
}
