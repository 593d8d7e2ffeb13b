use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Trimmed, non-blank lines in document order.
pub fn normalize(text: &str) -> Vec<&str> {
    text.lines()
        .map(clean)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Trimmed lines with blank lines kept as `""`, so block separators survive.
pub fn trimmed(text: &str) -> Vec<&str> {
    text.lines().map(clean).collect()
}

/// Collapse every whitespace run (including newlines) to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(s.trim(), " ").into_owned()
}

fn clean(line: &str) -> &str {
    // pdf text often carries a BOM or NULs at line edges
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}' || c == '\0')
}
