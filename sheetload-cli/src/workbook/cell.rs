//! Cell values normalized from calamine's cell type

use calamine::Data;
use chrono::NaiveDateTime;

/// A single spreadsheet cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (or an error cell, which loads as null)
    Null,
    /// Text value
    String(String),
    /// Whole number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date and time, already converted from the spreadsheet serial
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Numeric view, for NUMERIC columns
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Datetime view, for TIMESTAMP columns
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Text view, for TEXT columns
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(format_float(*f)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::DateTime(dt) => Some(dt.to_string()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Null,
            Data::String(s) => CellValue::String(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(dt) => CellValue::DateTime(dt),
                None => CellValue::Null,
            },
            Data::DateTimeIso(s) => match s.parse::<NaiveDateTime>() {
                Ok(dt) => CellValue::DateTime(dt),
                Err(_) => CellValue::String(s.clone()),
            },
            Data::DurationIso(s) => CellValue::String(s.clone()),
            Data::Error(_) => CellValue::Null,
        }
    }
}

/// Render a header cell to its column label
pub fn header_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

// Integral floats print without the trailing ".0" so spreadsheet numbers
// that are really integers survive as-is. 2^53 is the largest exact
// integer an f64 can hold.
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data() {
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Null);
        assert_eq!(
            CellValue::from(&Data::String("hello".into())),
            CellValue::String("hello".into())
        );
        assert_eq!(CellValue::from(&Data::Int(42)), CellValue::Int(42));
        assert_eq!(CellValue::from(&Data::Float(3.25)), CellValue::Float(3.25));
        assert_eq!(CellValue::from(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_iso_datetime_parses() {
        let cell = CellValue::from(&Data::DateTimeIso("2024-06-01T12:30:00".into()));
        match cell {
            CellValue::DateTime(dt) => assert_eq!(dt.to_string(), "2024-06-01 12:30:00"),
            other => panic!("expected datetime, got {:?}", other),
        }
    }

    #[test]
    fn test_text_view_formats_integral_floats() {
        assert_eq!(CellValue::Float(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(CellValue::Float(3.5).as_text().as_deref(), Some("3.5"));
        assert_eq!(CellValue::Int(7).as_text().as_deref(), Some("7"));
        assert_eq!(CellValue::Bool(false).as_text().as_deref(), Some("false"));
        assert_eq!(CellValue::Null.as_text(), None);
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(CellValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(CellValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(CellValue::String("2".into()).as_f64(), None);
        assert_eq!(CellValue::Null.as_f64(), None);
    }

    #[test]
    fn test_header_label() {
        assert_eq!(header_label(&Data::String("Order Id".into())), "Order Id");
        assert_eq!(header_label(&Data::Float(2024.0)), "2024");
        assert_eq!(header_label(&Data::Empty), "");
    }
}
