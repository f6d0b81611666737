//! PostgreSQL connection and catalog queries

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseConfig;

/// Open a single-connection pool and probe the server version.
/// The workflow is strictly sequential, so one connection is enough.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let version: String = sqlx::query_scalar("SELECT version()")
        .fetch_one(&pool)
        .await
        .context("Failed to query server version")?;
    log::info!("Connected: {}", version);

    Ok(pool)
}

/// Quote an identifier for direct inclusion in SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Check whether a table exists in the given schema
pub async fn table_exists(pool: &PgPool, schema: &str, table: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
             SELECT 1 FROM information_schema.tables
             WHERE table_schema = $1 AND table_name = $2
         )",
    )
    .bind(schema)
    .bind(table)
    .fetch_one(pool)
    .await
    .with_context(|| format!("Failed to check whether table '{}' exists", table))?;

    Ok(exists)
}

/// A table listed from the catalog
#[derive(Debug)]
pub struct TableEntry {
    pub name: String,
    pub column_count: i64,
}

/// List tables in a schema with their column counts
pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<TableEntry>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT t.table_name::TEXT, COUNT(c.column_name)::BIGINT
         FROM information_schema.tables t
         JOIN information_schema.columns c
           ON c.table_schema = t.table_schema AND c.table_name = t.table_name
         WHERE t.table_schema = $1 AND t.table_type = 'BASE TABLE'
         GROUP BY t.table_name
         ORDER BY t.table_name",
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .context("Failed to list tables")?;

    Ok(rows
        .into_iter()
        .map(|(name, column_count)| TableEntry { name, column_count })
        .collect())
}

/// Column metadata for a single table
#[derive(Debug)]
pub struct ColumnEntry {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

/// Read a table's columns in ordinal order
pub async fn table_columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<ColumnEntry>> {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT column_name::TEXT, data_type::TEXT, is_nullable::TEXT
         FROM information_schema.columns
         WHERE table_schema = $1 AND table_name = $2
         ORDER BY ordinal_position",
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to read columns of table '{}'", table))?;

    Ok(rows
        .into_iter()
        .map(|(name, data_type, is_nullable)| ColumnEntry {
            name,
            data_type,
            is_nullable: is_nullable == "YES",
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("weird\"name"), "\"weird\"\"name\"");
    }
}
