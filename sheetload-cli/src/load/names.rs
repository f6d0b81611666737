//! Label sanitization for table and column names

use std::sync::OnceLock;

use regex::Regex;

static SEPARATORS: OnceLock<Regex> = OnceLock::new();

/// Normalize a free-text label into a database-safe identifier.
///
/// Lowercases the label, collapses every run of non-word characters and
/// underscores into a single `_`, and strips leading/trailing underscores.
/// Distinct labels can collide ("Sales 2024" and "Sales-2024" both become
/// "sales_2024"); collisions are not detected here.
pub fn sanitize_name(label: &str) -> String {
    let separators = SEPARATORS.get_or_init(|| Regex::new(r"[\W_]+").unwrap());
    let lowered = label.to_lowercase();
    separators
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}
