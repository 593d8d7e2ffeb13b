use std::sync::LazyLock;

use regex::Regex;

static COLUMN_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Code, title, lecturer, venue.
pub const EXPECTED_COLUMNS: usize = 4;

/// Split a row on runs of two or more whitespace characters. Anything past
/// the fourth column is venue/remarks text and gets folded into the last one.
pub fn split_columns(row: &str) -> Vec<String> {
    let fields: Vec<String> = COLUMN_GAP_RE
        .split(row)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    compact(fields)
}

pub fn column_count(row: &str) -> usize {
    COLUMN_GAP_RE
        .split(row)
        .filter(|f| !f.trim().is_empty())
        .count()
}

pub(crate) fn compact(mut fields: Vec<String>) -> Vec<String> {
    if fields.len() <= EXPECTED_COLUMNS {
        return fields;
    }
    let tail = fields.split_off(EXPECTED_COLUMNS - 1).join(" ");
    fields.push(tail);
    fields
}
