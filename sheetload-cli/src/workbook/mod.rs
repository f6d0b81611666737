//! Workbook reading: one tabular [`Sheet`] per spreadsheet tab

pub mod cell;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};

pub use cell::CellValue;

/// One named tabular dataset within a workbook.
///
/// The first spreadsheet row is the header; remaining rows are data,
/// normalized to the header width (short rows padded with nulls, long
/// rows truncated).
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Which sheet to pull out of a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// Zero-based position in workbook order
    Index(usize),
    /// Sheet name, matched exactly
    Name(String),
}

impl SheetSelector {
    /// An argument consisting solely of digits parses as a zero-based
    /// index, anything else as a sheet name.
    pub fn parse(s: &str) -> Self {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(idx) = s.parse::<usize>() {
                return SheetSelector::Index(idx);
            }
        }
        SheetSelector::Name(s.to_string())
    }

    /// Label the destination table takes when no explicit name is given
    pub fn default_table_label(&self) -> String {
        match self {
            SheetSelector::Index(idx) => format!("sheet_{}", idx),
            SheetSelector::Name(name) => name.clone(),
        }
    }
}

/// Read every sheet in the workbook, in workbook order
pub fn read_all(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet '{}'", name))?;
        sheets.push(sheet_from_range(&name, &range));
    }
    Ok(sheets)
}

/// Read a single sheet selected by name or zero-based index
pub fn read_one(path: &Path, selector: &SheetSelector) -> Result<Sheet> {
    let mut workbook = open(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let name = match selector {
        SheetSelector::Index(idx) => names.get(*idx).cloned().with_context(|| {
            format!(
                "Sheet index {} is out of range ({} sheets in workbook)",
                idx,
                names.len()
            )
        })?,
        SheetSelector::Name(name) => {
            if !names.iter().any(|n| n == name) {
                bail!("No sheet named '{}' in workbook", name);
            }
            name.clone()
        }
    };

    let range = workbook
        .worksheet_range(&name)
        .with_context(|| format!("Failed to read sheet '{}'", name))?;
    Ok(sheet_from_range(&name, &range))
}

fn open(path: &Path) -> Result<Sheets<BufReader<File>>> {
    if !path.exists() {
        bail!("Workbook file not found: {}", path.display());
    }
    open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))
}

fn sheet_from_range(name: &str, range: &Range<Data>) -> Sheet {
    let mut rows_iter = range.rows();

    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header.iter().map(cell::header_label).collect(),
        None => Vec::new(),
    };

    let width = columns.len();
    let rows: Vec<Vec<CellValue>> = rows_iter
        .map(|row| {
            (0..width)
                .map(|i| row.get(i).map(CellValue::from).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Sheet {
        name: name.to_string(),
        columns,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;

    fn fixture(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("fixture.xlsx");
        let mut workbook = Workbook::new();

        let sales = workbook.add_worksheet();
        sales.set_name("Sales 2024").unwrap();
        sales.write_string(0, 0, "Product").unwrap();
        sales.write_string(0, 1, "Amount").unwrap();
        sales.write_string(1, 0, "Widget").unwrap();
        sales.write_number(1, 1, 12.5).unwrap();
        sales.write_string(2, 0, "Gadget").unwrap();
        sales.write_number(2, 1, 3.0).unwrap();

        let orders = workbook.add_worksheet();
        orders.set_name("Orders").unwrap();
        orders.write_string(0, 0, "Order Id").unwrap();
        orders.write_string(0, 1, "Note").unwrap();
        orders.write_number(1, 0, 1.0).unwrap();
        orders.write_string(1, 1, "first").unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_all_preserves_workbook_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir);

        let sheets = read_all(&path).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Sales 2024");
        assert_eq!(sheets[1].name, "Orders");

        assert_eq!(sheets[0].columns, vec!["Product", "Amount"]);
        assert_eq!(sheets[0].row_count(), 2);
        assert_eq!(sheets[0].rows[0][0], CellValue::String("Widget".into()));
        assert_eq!(sheets[0].rows[0][1], CellValue::Float(12.5));

        assert_eq!(sheets[1].columns, vec!["Order Id", "Note"]);
        assert_eq!(sheets[1].row_count(), 1);
    }

    #[test]
    fn test_read_one_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir);

        let sheet = read_one(&path, &SheetSelector::Index(1)).unwrap();
        assert_eq!(sheet.name, "Orders");
        assert_eq!(sheet.row_count(), 1);
    }

    #[test]
    fn test_read_one_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir);

        let sheet = read_one(&path, &SheetSelector::Name("Sales 2024".into())).unwrap();
        assert_eq!(sheet.columns, vec!["Product", "Amount"]);
    }

    #[test]
    fn test_index_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir);

        let err = read_one(&path, &SheetSelector::Index(5)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_unknown_sheet_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir);

        let err = read_one(&path, &SheetSelector::Name("Missing".into())).unwrap_err();
        assert!(err.to_string().contains("No sheet named"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_all(Path::new("/no/such/workbook.xlsx")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(SheetSelector::parse("0"), SheetSelector::Index(0));
        assert_eq!(SheetSelector::parse("12"), SheetSelector::Index(12));
        assert_eq!(
            SheetSelector::parse("Sales"),
            SheetSelector::Name("Sales".into())
        );
        assert_eq!(
            SheetSelector::parse("2024 Sales"),
            SheetSelector::Name("2024 Sales".into())
        );
        assert_eq!(SheetSelector::parse(""), SheetSelector::Name("".into()));
    }

    #[test]
    fn test_default_table_label() {
        assert_eq!(SheetSelector::Index(0).default_table_label(), "sheet_0");
        assert_eq!(
            SheetSelector::Name("Orders".into()).default_table_label(),
            "Orders"
        );
    }

    #[test]
    fn test_short_rows_padded_to_header_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "A").unwrap();
        sheet.write_string(0, 1, "B").unwrap();
        sheet.write_string(1, 0, "only-a").unwrap();
        workbook.save(&path).unwrap();

        let sheets = read_all(&path).unwrap();
        assert_eq!(sheets[0].rows[0].len(), 2);
        assert_eq!(sheets[0].rows[0][1], CellValue::Null);
    }
}
