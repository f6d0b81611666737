//! Workbook load command handler

use std::path::Path;

use anyhow::{Result, bail};
use sqlx::PgPool;

use crate::cli::Cli;
use crate::load::{self, LoadOptions};
use crate::workbook::SheetSelector;

/// Run the load in single-sheet or all-sheets mode and turn the
/// per-sheet results into the process outcome.
pub async fn handle_load(pool: &PgPool, file: &Path, cli: &Cli) -> Result<()> {
    let options = LoadOptions {
        mode: cli.mode,
        schema: cli.schema.clone(),
        create_id_column: !cli.no_id,
    };

    if cli.all_sheets {
        let results = load::load_all_sheets(pool, file, &options).await?;

        let succeeded = results.iter().filter(|r| r.success).count();
        log::info!("Loaded {} of {} sheets", succeeded, results.len());
        for result in &results {
            if result.success {
                log::info!(
                    "  '{}' -> '{}': {} rows in {:.2}s",
                    result.sheet,
                    result.table,
                    result.actual_rows.unwrap_or(result.expected_rows as i64),
                    result.elapsed.as_secs_f64()
                );
            } else {
                log::error!("  '{}' -> '{}': failed", result.sheet, result.table);
            }
        }

        if succeeded != results.len() {
            bail!(
                "{} of {} sheets failed to load",
                results.len() - succeeded,
                results.len()
            );
        }
        Ok(())
    } else {
        let selector = cli
            .sheet
            .as_deref()
            .map(SheetSelector::parse)
            .unwrap_or(SheetSelector::Index(0));

        let result =
            load::load_single_sheet(pool, file, &selector, cli.table.as_deref(), &options).await?;
        if !result.success {
            bail!(
                "Failed to load sheet '{}' into table '{}'",
                result.sheet,
                result.table
            );
        }
        Ok(())
    }
}
