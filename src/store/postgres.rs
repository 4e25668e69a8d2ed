use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};

use super::{check_address, set_cell, CellRef, RowStore, StoreError};

/// Workbook persisted in PostgreSQL: one row in `worksheet_rows` per sheet row,
/// cells kept as a `TEXT[]` in column order.
#[derive(Clone)]
pub struct PgWorkbook {
    pool: PgPool,
}

impl PgWorkbook {
    /// Connect and bring the workbook tables up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await?;
        let book = Self { pool };
        book.migrate().await?;
        Ok(book)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        log::info!("Workbook migrations complete");
        Ok(())
    }
}

fn db_index(row: usize, col: usize) -> Result<(i32, i32), StoreError> {
    check_address(row, col)?;
    let r = i32::try_from(row).map_err(|_| StoreError::InvalidAddress { row, col })?;
    let c = i32::try_from(col).map_err(|_| StoreError::InvalidAddress { row, col })?;
    Ok((r, c))
}

/// Take the per-worksheet lock that serializes row renumbering and appends.
async fn lock_sheet(tx: &mut Transaction<'_, Postgres>, sheet: &str) -> Result<(), StoreError> {
    let found: Option<(String,)> =
        sqlx::query_as("SELECT title FROM worksheets WHERE title = $1 FOR UPDATE")
            .bind(sheet)
            .fetch_optional(&mut **tx)
            .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::WorksheetNotFound(sheet.to_string())),
    }
}

async fn next_row(tx: &mut Transaction<'_, Postgres>, sheet: &str) -> Result<i32, StoreError> {
    let last: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(row_num), 0) FROM worksheet_rows WHERE worksheet = $1",
    )
    .bind(sheet)
    .fetch_one(&mut **tx)
    .await?;
    Ok(last + 1)
}

async fn insert_row(
    tx: &mut Transaction<'_, Postgres>,
    sheet: &str,
    row: i32,
    cells: &[String],
) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO worksheet_rows (worksheet, row_num, cells) VALUES ($1, $2, $3)")
        .bind(sheet)
        .bind(row)
        .bind(cells)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl RowStore for PgWorkbook {
    async fn has_worksheet(&self, sheet: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM worksheets WHERE title = $1)")
                .bind(sheet)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create_worksheet(&self, sheet: &str, headers: &[&str]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO worksheets (title) VALUES ($1) ON CONFLICT (title) DO NOTHING")
            .bind(sheet)
            .execute(&mut *tx)
            .await?;
        lock_sheet(&mut tx, sheet).await?;

        let has_header: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM worksheet_rows WHERE worksheet = $1 AND row_num = 1)",
        )
        .bind(sheet)
        .fetch_one(&mut *tx)
        .await?;
        if !has_header {
            let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
            insert_row(&mut tx, sheet, 1, &header).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find(
        &self,
        sheet: &str,
        value: &str,
        column: Option<usize>,
    ) -> Result<Option<CellRef>, StoreError> {
        let hit: Option<(i32, Option<i32>)> = match column {
            Some(col) => {
                let (_, c) = db_index(1, col)?;
                sqlx::query_as(
                    "SELECT row_num, $2::INTEGER FROM worksheet_rows \
                     WHERE worksheet = $1 AND row_num > 1 AND cells[$2] = $3 \
                     ORDER BY row_num LIMIT 1",
                )
                .bind(sheet)
                .bind(c)
                .bind(value)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT row_num, array_position(cells, $2) FROM worksheet_rows \
                     WHERE worksheet = $1 AND row_num > 1 AND $2 = ANY(cells) \
                     ORDER BY row_num LIMIT 1",
                )
                .bind(sheet)
                .bind(value)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(hit.and_then(|(row, col)| {
            Some(CellRef {
                row: usize::try_from(row).ok()?,
                col: usize::try_from(col?).ok()?,
            })
        }))
    }

    async fn row_values(&self, sheet: &str, row: usize) -> Result<Vec<String>, StoreError> {
        let (r, _) = db_index(row, 1)?;
        let cells: Option<(Vec<String>,)> = sqlx::query_as(
            "SELECT cells FROM worksheet_rows WHERE worksheet = $1 AND row_num = $2",
        )
        .bind(sheet)
        .bind(r)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cells.map(|c| c.0).unwrap_or_default())
    }

    async fn all_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let rows: Vec<(i32, Vec<String>)> = sqlx::query_as(
            "SELECT row_num, cells FROM worksheet_rows WHERE worksheet = $1 ORDER BY row_num",
        )
        .bind(sheet)
        .fetch_all(&self.pool)
        .await?;

        // Rows written past the end leave gaps; surface them as empty rows.
        let mut dense: Vec<Vec<String>> = Vec::with_capacity(rows.len());
        for (row_num, cells) in rows {
            let index = usize::try_from(row_num).unwrap_or(1).saturating_sub(1);
            if dense.len() < index {
                dense.resize(index, Vec::new());
            }
            dense.push(cells);
        }
        Ok(dense)
    }

    async fn update_cell(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        self.update_cells(sheet, row, &[(col, value.to_string())]).await
    }

    async fn update_cells(
        &self,
        sheet: &str,
        row: usize,
        cells: &[(usize, String)],
    ) -> Result<(), StoreError> {
        let (r, _) = db_index(row, 1)?;
        for (col, _) in cells {
            db_index(row, *col)?;
        }

        let mut tx = self.pool.begin().await?;
        lock_sheet(&mut tx, sheet).await?;
        let existing: Option<(Vec<String>,)> = sqlx::query_as(
            "SELECT cells FROM worksheet_rows WHERE worksheet = $1 AND row_num = $2",
        )
        .bind(sheet)
        .bind(r)
        .fetch_optional(&mut *tx)
        .await?;

        let is_new = existing.is_none();
        let mut current = existing.map(|c| c.0).unwrap_or_default();
        for (col, value) in cells {
            set_cell(&mut current, *col, value);
        }

        if is_new {
            insert_row(&mut tx, sheet, r, &current).await?;
        } else {
            sqlx::query(
                "UPDATE worksheet_rows SET cells = $3, updated_at = now() \
                 WHERE worksheet = $1 AND row_num = $2",
            )
            .bind(sheet)
            .bind(r)
            .bind(&current)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn append_row(&self, sheet: &str, values: &[String]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_sheet(&mut tx, sheet).await?;
        let row = next_row(&mut tx, sheet).await?;
        insert_row(&mut tx, sheet, row, values).await?;
        tx.commit().await?;
        Ok(usize::try_from(row).unwrap_or_default())
    }

    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_sheet(&mut tx, sheet).await?;
        let mut row = next_row(&mut tx, sheet).await?;
        for values in rows {
            insert_row(&mut tx, sheet, row, values).await?;
            row += 1;
        }
        tx.commit().await?;
        Ok(rows.len())
    }

    async fn delete_row(&self, sheet: &str, row: usize) -> Result<(), StoreError> {
        let (r, _) = db_index(row, 1)?;
        let mut tx = self.pool.begin().await?;
        lock_sheet(&mut tx, sheet).await?;
        sqlx::query("DELETE FROM worksheet_rows WHERE worksheet = $1 AND row_num = $2")
            .bind(sheet)
            .bind(r)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE worksheet_rows SET row_num = row_num - 1 \
             WHERE worksheet = $1 AND row_num > $2",
        )
        .bind(sheet)
        .bind(r)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
