//! The sheet-to-table load workflow

pub mod descriptor;
pub mod names;
pub mod writer;

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use sqlx::PgPool;

use crate::cli::WriteMode;
use crate::db;
use crate::workbook::{self, Sheet, SheetSelector};

use descriptor::TableDescriptor;
use names::sanitize_name;

/// Settings shared by every sheet in one invocation
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub mode: WriteMode,
    pub schema: String,
    pub create_id_column: bool,
}

/// Outcome of loading one sheet
#[derive(Debug)]
pub struct LoadResult {
    pub sheet: String,
    pub table: String,
    pub success: bool,
    pub expected_rows: usize,
    pub actual_rows: Option<i64>,
    pub elapsed: Duration,
}

/// Load every sheet in the workbook, in workbook order.
///
/// Failing to read the workbook itself is fatal. A failure in any single
/// sheet is logged and recorded in its [`LoadResult`], and the loop
/// continues with the remaining sheets.
pub async fn load_all_sheets(
    pool: &PgPool,
    path: &Path,
    options: &LoadOptions,
) -> Result<Vec<LoadResult>> {
    let sheets = workbook::read_all(path)?;
    log::info!("Found {} sheets in {}", sheets.len(), path.display());

    let mut results = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let table_label = sheet.name.clone();
        results.push(load_sheet(pool, sheet, &table_label, options).await);
    }
    Ok(results)
}

/// Load one sheet selected by name or index. An explicit `table_override`
/// wins over the selector-derived table name.
pub async fn load_single_sheet(
    pool: &PgPool,
    path: &Path,
    selector: &SheetSelector,
    table_override: Option<&str>,
    options: &LoadOptions,
) -> Result<LoadResult> {
    let sheet = workbook::read_one(path, selector)?;

    let table_label = match table_override {
        Some(table) => table.to_string(),
        None => selector.default_table_label(),
    };
    Ok(load_sheet(pool, sheet, &table_label, options).await)
}

/// Process one sheet end to end. Errors are swallowed here at the sheet
/// boundary: logged and recorded so remaining sheets still run.
async fn load_sheet(
    pool: &PgPool,
    mut sheet: Sheet,
    table_label: &str,
    options: &LoadOptions,
) -> LoadResult {
    let start = Instant::now();
    let sheet_name = sheet.name.clone();
    let expected_rows = sheet.row_count();

    match write_sheet(pool, &mut sheet, table_label, options).await {
        Ok((table, actual_rows)) => {
            log::info!(
                "Loaded sheet '{}' into '{}' in {:.2}s",
                sheet_name,
                table,
                start.elapsed().as_secs_f64()
            );
            LoadResult {
                sheet: sheet_name,
                table,
                success: true,
                expected_rows,
                actual_rows,
                elapsed: start.elapsed(),
            }
        }
        Err(e) => {
            log::error!("Failed to load sheet '{}': {:#}", sheet_name, e);
            LoadResult {
                sheet: sheet_name,
                table: sanitize_name(table_label),
                success: false,
                expected_rows,
                actual_rows: None,
                elapsed: start.elapsed(),
            }
        }
    }
}

async fn write_sheet(
    pool: &PgPool,
    sheet: &mut Sheet,
    table_label: &str,
    options: &LoadOptions,
) -> Result<(String, Option<i64>)> {
    log::info!(
        "Sheet '{}': {} rows, {} columns",
        sheet.name,
        sheet.row_count(),
        sheet.column_count()
    );

    let descriptor = TableDescriptor::derive(sheet, table_label, options.create_id_column)?;
    let table = descriptor.table.clone();
    log::info!("Loading sheet '{}' as table '{}'", sheet.name, table);
    if descriptor.id_column_added {
        log::debug!("Appended synthetic id column to sheet '{}'", sheet.name);
    }

    let exists = db::table_exists(pool, &options.schema, &table).await?;
    match plan_table_action(options.mode, exists) {
        TableAction::Abort => {
            anyhow::bail!("Table '{}' already exists (mode: fail)", table)
        }
        TableAction::Recreate => {
            writer::drop_table(pool, &options.schema, &table).await?;
        }
        TableAction::Keep => {}
    }

    writer::ensure_table(pool, &options.schema, &descriptor).await?;
    writer::insert_rows(pool, &options.schema, &descriptor, &sheet.rows).await?;
    let actual = writer::verify(pool, &options.schema, &table, sheet.row_count()).await;

    Ok((table, actual))
}

/// What happens to the destination table before inserting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableAction {
    /// Create when absent, keep any existing rows
    Keep,
    /// Drop the existing table and recreate it empty
    Recreate,
    /// Abort the sheet, leaving the table untouched
    Abort,
}

fn plan_table_action(mode: WriteMode, exists: bool) -> TableAction {
    match (mode, exists) {
        (WriteMode::Fail, true) => TableAction::Abort,
        (WriteMode::Replace, true) => TableAction::Recreate,
        _ => TableAction::Keep,
    }
}
