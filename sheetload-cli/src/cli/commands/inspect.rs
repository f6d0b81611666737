//! Inspection commands for existing tables

use anyhow::Result;
use colored::*;
use sqlx::PgPool;

use crate::db;

/// Print every table in the schema with its column count
pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<()> {
    let tables = db::list_tables(pool, schema).await?;
    if tables.is_empty() {
        println!("No tables in schema '{}'", schema);
        return Ok(());
    }

    println!("Tables in schema '{}':", schema.bright_green());
    for table in &tables {
        println!(
            "  - {} ({} columns)",
            table.name.cyan(),
            table.column_count
        );
    }
    Ok(())
}

/// Print one table's columns with type and nullability
pub async fn table_info(pool: &PgPool, schema: &str, table: &str) -> Result<()> {
    let columns = db::table_columns(pool, schema, table).await?;
    if columns.is_empty() {
        anyhow::bail!("Table '{}' not found in schema '{}'", table, schema);
    }

    println!("Table {}:", table.bright_green());
    for column in &columns {
        let nullable = if column.is_nullable {
            "nullable"
        } else {
            "not null"
        };
        println!(
            "  - {}: {} ({})",
            column.name.cyan(),
            column.data_type,
            nullable.dimmed()
        );
    }
    Ok(())
}
