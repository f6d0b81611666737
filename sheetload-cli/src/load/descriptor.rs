//! Destination table shape derived from a sheet

use anyhow::{Result, bail};

use crate::workbook::{CellValue, Sheet};

use super::names::sanitize_name;

/// Storage type for a destination column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Numeric,
    Timestamp,
    Text,
}

impl ColumnType {
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Text => "TEXT",
        }
    }
}

/// A destination column: sanitized name plus storage type
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: ColumnType,
}

/// Sanitized shape of a destination table
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
    pub id_column_added: bool,
}

impl TableDescriptor {
    /// Derive the descriptor for a sheet.
    ///
    /// Sanitizes the table label and every column label (a column whose
    /// label sanitizes to empty falls back to its 1-based position), and
    /// appends the synthetic `id` column to the sheet when requested and
    /// no existing column already sanitizes to `id`. Duplicate sanitized
    /// column names are not deduplicated.
    pub fn derive(sheet: &mut Sheet, table_label: &str, create_id_column: bool) -> Result<Self> {
        let table = sanitize_name(table_label);
        if table.is_empty() {
            bail!("Table name '{}' is empty after sanitization", table_label);
        }

        let mut columns: Vec<ColumnSpec> = sheet
            .columns
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let name = match sanitize_name(label) {
                    s if s.is_empty() => format!("column_{}", i + 1),
                    s => s,
                };
                ColumnSpec {
                    name,
                    ty: infer_column_type(&sheet.rows, i),
                }
            })
            .collect();

        let id_column_added = create_id_column && !columns.iter().any(|c| c.name == "id");
        if id_column_added {
            inject_id_column(sheet);
            columns.push(ColumnSpec {
                name: "id".to_string(),
                ty: ColumnType::Numeric,
            });
        }

        Ok(TableDescriptor {
            table,
            columns,
            id_column_added,
        })
    }
}

/// NUMERIC when every non-null cell is numeric, TIMESTAMP when every
/// non-null cell is a datetime, TEXT otherwise (mixed, string, boolean,
/// and entirely empty columns).
fn infer_column_type(rows: &[Vec<CellValue>], col: usize) -> ColumnType {
    let mut saw_value = false;
    let mut all_numeric = true;
    let mut all_datetime = true;

    for row in rows {
        match row.get(col) {
            None | Some(CellValue::Null) => continue,
            Some(CellValue::Int(_)) | Some(CellValue::Float(_)) => {
                saw_value = true;
                all_datetime = false;
            }
            Some(CellValue::DateTime(_)) => {
                saw_value = true;
                all_numeric = false;
            }
            Some(_) => {
                saw_value = true;
                all_numeric = false;
                all_datetime = false;
            }
        }
    }

    if saw_value && all_numeric {
        ColumnType::Numeric
    } else if saw_value && all_datetime {
        ColumnType::Timestamp
    } else {
        ColumnType::Text
    }
}

/// Append 1-based sequential row numbers as a trailing `id` column
fn inject_id_column(sheet: &mut Sheet) {
    sheet.columns.push("id".to_string());
    for (i, row) in sheet.rows.iter_mut().enumerate() {
        row.push(CellValue::Int(i as i64 + 1));
    }
}
