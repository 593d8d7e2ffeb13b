use std::sync::LazyLock;

use regex::Regex;

/// One course code, or several joined by `/` ("CPS 416/ CPS 313").
const CODE_LIST: &str = r"[A-Z]{2,4}\s*\d{3}(?:\s*/\s*[A-Z]{2,4}\s*\d{3})*";

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z]{2,4}\s*\d{3}\b").unwrap());
static CODE_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b{}\b", CODE_LIST)).unwrap());
static WHOLE_CODE_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{}$", CODE_LIST)).unwrap());
static LEADING_CODE_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^({})\s+(\S.*)$", CODE_LIST)).unwrap());
static SINGLE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,4}\s*\d{3}$").unwrap());

pub fn contains_code(s: &str) -> bool {
    CODE_RE.is_match(s)
}

/// True when the whole field is a code or a `/`-joined list of codes.
pub fn is_code_list(s: &str) -> bool {
    WHOLE_CODE_LIST_RE.is_match(s.trim())
}

pub fn is_course_code(s: &str) -> bool {
    SINGLE_CODE_RE.is_match(s)
}

/// Split a field that starts with a code list glued to more text into
/// `(codes, rest)`.
pub fn split_leading_codes(field: &str) -> Option<(&str, &str)> {
    let caps = LEADING_CODE_LIST_RE.captures(field.trim())?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Divide a logical row into one chunk per course-code occurrence. Rows with
/// fewer than two occurrences come back whole.
pub fn split_by_codes(row: &str) -> Vec<&str> {
    let starts: Vec<usize> = CODE_LIST_RE.find_iter(row).map(|m| m.start()).collect();
    if starts.len() < 2 {
        return vec![row];
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(row.len());
            row[start..end].trim()
        })
        .collect()
}

/// "CPS 416/ CPS 313" → ["CPS 416", "CPS 313"]
pub fn expand_codes(field: &str) -> Vec<&str> {
    field
        .split('/')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}
