use serde_json::{Map, Value};

/// Raw lead record as received from the HTTP layer: a JSON object mapping
/// recognized column names to a number, a string, or nothing at all.
pub type RawLeadRecord = Map<String, Value>;

/// Sentinel category used for missing or blank categorical values.
pub const SENTINEL_CATEGORY: &str = "Not Specified";

/// Raw feature columns in training order. The preprocessor artifact and the
/// transform both follow this order; it must not be reordered without
/// retraining the artifacts.
pub const EXPECTED_COLUMNS: [&str; 22] = [
    "Lead Origin",
    "Lead Source",
    "Do Not Email",
    "Do Not Call",
    "TotalVisits",
    "Total Time Spent on Website",
    "Page Views Per Visit",
    "Last Activity",
    "Country",
    "Specialization",
    "What is your current occupation",
    "Search",
    "Newspaper Article",
    "X Education Forums",
    "Newspaper",
    "Digital Advertisement",
    "Through Recommendations",
    "Tags",
    "Lead Quality",
    "City",
    "A free copy of Mastering The Interview",
    "Last Notable Activity",
];

/// Columns carrying numeric engagement metrics; everything else in
/// [`EXPECTED_COLUMNS`] is categorical.
pub const NUMERIC_COLUMNS: [&str; 3] = [
    "TotalVisits",
    "Total Time Spent on Website",
    "Page Views Per Visit",
];

/// Whether a recognized column is numeric.
pub fn is_numeric(column: &str) -> bool {
    NUMERIC_COLUMNS.contains(&column)
}

/// Resolves an incoming record key to its canonical column name.
///
/// Keys arrive from forms and hand-written JSON with inconsistent spacing
/// and casing, so the lookup trims whitespace and falls back to a
/// case-insensitive comparison. Returns `None` for unrecognized keys;
/// the caller decides whether to ignore or report them.
pub fn resolve_column(key: &str) -> Option<&'static str> {
    let trimmed = key.trim();
    if let Some(col) = EXPECTED_COLUMNS.iter().find(|c| **c == trimmed) {
        return Some(col);
    }
    EXPECTED_COLUMNS
        .iter()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
        .copied()
}

/// Looks up a value in a raw record by canonical column name, tolerating
/// key spacing/casing variance on the record side.
pub fn lookup<'a>(record: &'a RawLeadRecord, column: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(column) {
        return Some(value);
    }
    record
        .iter()
        .find(|(key, _)| resolve_column(key) == Some(column))
        .map(|(_, value)| value)
}
