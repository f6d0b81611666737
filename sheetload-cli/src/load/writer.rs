//! Destination table creation, population, and verification

use anyhow::{Context, Result};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

use crate::db::quote_ident;
use crate::workbook::CellValue;

use super::descriptor::{ColumnType, TableDescriptor};

// PostgreSQL caps bind parameters at 65535 per statement; chunks stay
// well under it.
const MAX_BIND_PARAMS: usize = 60_000;

/// Create the destination table when absent
pub async fn ensure_table(pool: &PgPool, schema: &str, descriptor: &TableDescriptor) -> Result<()> {
    let sql = create_table_sql(schema, descriptor);
    sqlx::query(&sql).execute(pool).await.with_context(|| {
        format!(
            "Failed to create table {}",
            qualified(schema, &descriptor.table)
        )
    })?;
    Ok(())
}

/// Drop the destination table when present (replace mode)
pub async fn drop_table(pool: &PgPool, schema: &str, table: &str) -> Result<()> {
    let sql = format!("DROP TABLE IF EXISTS {}", qualified(schema, table));
    sqlx::query(&sql)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to drop table {}", qualified(schema, table)))?;
    Ok(())
}

/// Insert sheet rows, chunked to stay under the bind parameter limit.
/// Each cell binds according to its column's storage type; a failure
/// mid-write can leave the table partially populated.
pub async fn insert_rows(
    pool: &PgPool,
    schema: &str,
    descriptor: &TableDescriptor,
    rows: &[Vec<CellValue>],
) -> Result<()> {
    if rows.is_empty() || descriptor.columns.is_empty() {
        return Ok(());
    }

    for chunk in rows.chunks(rows_per_chunk(descriptor.columns.len())) {
        let sql = insert_sql(schema, descriptor, chunk.len());
        let mut query = sqlx::query(&sql);
        for row in chunk {
            for (i, column) in descriptor.columns.iter().enumerate() {
                let cell = row.get(i).unwrap_or(&CellValue::Null);
                query = bind_cell(query, cell, column.ty);
            }
        }
        query.execute(pool).await.with_context(|| {
            format!(
                "Failed to insert rows into {}",
                qualified(schema, &descriptor.table)
            )
        })?;
    }
    Ok(())
}

/// Count rows post-write and compare against the sheet. Mismatches are
/// warnings and count failures are logged; neither fails the load.
pub async fn verify(pool: &PgPool, schema: &str, table: &str, expected: usize) -> Option<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", qualified(schema, table));
    match sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await {
        Ok(actual) => {
            if actual == expected as i64 {
                log::info!("Verified {}: {} rows", qualified(schema, table), actual);
            } else {
                log::warn!(
                    "Row count mismatch for {}: expected {}, found {}",
                    qualified(schema, table),
                    expected,
                    actual
                );
            }
            Some(actual)
        }
        Err(e) => {
            log::error!("Failed to verify {}: {}", qualified(schema, table), e);
            None
        }
    }
}

fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

fn create_table_sql(schema: &str, descriptor: &TableDescriptor) -> String {
    let columns = descriptor
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.ty.sql_name()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        qualified(schema, &descriptor.table),
        columns
    )
}

fn insert_sql(schema: &str, descriptor: &TableDescriptor, row_count: usize) -> String {
    let columns = descriptor
        .columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let width = descriptor.columns.len();
    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ",
        qualified(schema, &descriptor.table),
        columns
    );
    for row in 0..row_count {
        if row > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for col in 0..width {
            if col > 0 {
                sql.push_str(", ");
            }
            sql.push('$');
            sql.push_str(&(row * width + col + 1).to_string());
        }
        sql.push(')');
    }
    sql
}

fn rows_per_chunk(column_count: usize) -> usize {
    (MAX_BIND_PARAMS / column_count.max(1)).max(1)
}

fn bind_cell<'q>(
    query: Query<'q, Postgres, PgArguments>,
    cell: &CellValue,
    ty: ColumnType,
) -> Query<'q, Postgres, PgArguments> {
    match ty {
        ColumnType::Numeric => query.bind(cell.as_f64()),
        ColumnType::Timestamp => query.bind(cell.as_datetime()),
        ColumnType::Text => query.bind(cell.as_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::descriptor::ColumnSpec;

    fn descriptor() -> TableDescriptor {
        TableDescriptor {
            table: "sales_2024".to_string(),
            columns: vec![
                ColumnSpec {
                    name: "product".to_string(),
                    ty: ColumnType::Text,
                },
                ColumnSpec {
                    name: "amount".to_string(),
                    ty: ColumnType::Numeric,
                },
                ColumnSpec {
                    name: "sold_at".to_string(),
                    ty: ColumnType::Timestamp,
                },
            ],
            id_column_added: false,
        }
    }

    #[test]
    fn test_create_table_sql() {
        assert_eq!(
            create_table_sql("public", &descriptor()),
            "CREATE TABLE IF NOT EXISTS \"public\".\"sales_2024\" \
             (\"product\" TEXT, \"amount\" NUMERIC, \"sold_at\" TIMESTAMP)"
        );
    }

    #[test]
    fn test_insert_sql_numbers_placeholders_across_rows() {
        assert_eq!(
            insert_sql("public", &descriptor(), 2),
            "INSERT INTO \"public\".\"sales_2024\" (\"product\", \"amount\", \"sold_at\") \
             VALUES ($1, $2, $3), ($4, $5, $6)"
        );
    }

    #[test]
    fn test_rows_per_chunk_respects_param_limit() {
        assert_eq!(rows_per_chunk(3), 20_000);
        assert_eq!(rows_per_chunk(60_000), 1);
        // A degenerate wide row still makes progress one row at a time
        assert_eq!(rows_per_chunk(100_000), 1);
        assert_eq!(rows_per_chunk(0), MAX_BIND_PARAMS);
    }
}
