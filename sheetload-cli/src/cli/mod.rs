//! Command-line surface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

/// Load spreadsheet workbooks into PostgreSQL tables
#[derive(Debug, Parser)]
#[command(name = "sheetload", version, about)]
pub struct Cli {
    /// Path to the workbook file (.xlsx, .xls or .ods)
    pub file: Option<PathBuf>,

    /// Target table name (single-sheet mode only)
    #[arg(short, long)]
    pub table: Option<String>,

    /// Sheet to load: a sheet name or a zero-based index
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Load every sheet in the workbook
    #[arg(short = 'a', long)]
    pub all_sheets: bool,

    /// How rows interact with a pre-existing table
    #[arg(short, long, value_enum, default_value_t = WriteMode::Replace)]
    pub mode: WriteMode,

    /// Target schema
    #[arg(long, default_value = "public")]
    pub schema: String,

    /// Do not append a synthetic id column
    #[arg(long)]
    pub no_id: bool,

    /// List tables in the target schema and exit
    #[arg(long)]
    pub list_tables: bool,

    /// Show the column structure of a table and exit
    #[arg(long, value_name = "TABLE")]
    pub table_info: Option<String>,
}

/// Policy for rows landing in a pre-existing destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WriteMode {
    /// Drop and recreate the table, discarding prior contents
    Replace,
    /// Insert after existing rows
    Append,
    /// Abort the sheet if the table already exists
    Fail,
}

/// Dispatch the parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = crate::config::DatabaseConfig::from_env()?;
    let pool = crate::db::connect(&config).await?;

    if cli.list_tables {
        return commands::inspect::list_tables(&pool, &cli.schema).await;
    }
    if let Some(ref table) = cli.table_info {
        return commands::inspect::table_info(&pool, &cli.schema, table).await;
    }

    let Some(ref file) = cli.file else {
        anyhow::bail!("No workbook file given");
    };
    commands::load::handle_load(&pool, file, &cli).await
}
