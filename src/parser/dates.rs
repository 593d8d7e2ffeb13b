use std::sync::LazyLock;

use regex::{Captures, Regex};

// ── Time ranges ──

/// Whole letter runs (so `p.m.` and `Permanent` are judged as words) or any
/// other character that cannot be part of a time range.
static TIME_NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-z][a-z.]*|[^0-9:\s\-–]").unwrap());
static TIME_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*([ap]m\b)?\s*[–-]\s*(\d{1,2}):(\d{2})\s*([ap]m\b)?").unwrap()
});

// ── Dates ──

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^20\d{2}-\d{2}-\d{2}$").unwrap());
static NUMERIC_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](20\d{2})$").unwrap());
static NAMED_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3,})\s+(20\d{2})$").unwrap());
static EMBEDDED_ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(20\d{2}-\d{2}-\d{2})").unwrap());
static INLINE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(20\d{2}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/20\d{2}|\d{1,2}\s+[A-Za-z]{3,}\s+20\d{2})\b")
        .unwrap()
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun",
    "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Extract a `(start, end)` pair from text containing an `H:MM - H:MM` range.
/// Both sides come back as zero-padded 24-hour `HH:MM`.
pub fn parse_time_range(segment: &str) -> Option<(String, String)> {
    let cleaned = TIME_NOISE_RE.replace_all(segment, |caps: &Captures| {
        let word = caps[0].to_ascii_lowercase().replace('.', "");
        if word == "am" || word == "pm" {
            word
        } else {
            String::new()
        }
    });
    let caps = TIME_RANGE_RE.captures(&cleaned)?;
    let start = to_24h(&caps[1], &caps[2], caps.get(3).map(|m| m.as_str()));
    let end = to_24h(&caps[4], &caps[5], caps.get(6).map(|m| m.as_str()));
    Some((start, end))
}

/// Normalize a single `H:MM` (optionally followed by am/pm) to `HH:MM`.
pub fn normalize_time(raw: &str) -> Option<String> {
    static SINGLE_TIME_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})(?::\d{2})?\s*([ap]m)?$").unwrap());
    let caps = SINGLE_TIME_RE.captures(raw.trim())?;
    Some(to_24h(&caps[1], &caps[2], caps.get(3).map(|m| m.as_str())))
}

fn to_24h(hour: &str, minute: &str, meridiem: Option<&str>) -> String {
    let mut h: u32 = hour.parse().unwrap_or(0);
    match meridiem.map(|m| m.to_ascii_lowercase()) {
        Some(m) if m == "pm" && h < 12 => h += 12,
        Some(m) if m == "am" && h == 12 => h = 0,
        _ => {}
    }
    format!("{:02}:{}", h, minute)
}

/// Resolve a fragment to an ISO `YYYY-MM-DD` date. Notations are tried in
/// order: whole ISO, day-first numeric, `D Mon YYYY`, then any embedded ISO.
/// Day and month ranges are not validated.
pub fn to_iso_date(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if ISO_DATE_RE.is_match(s) {
        return Some(s.to_string());
    }

    if let Some(caps) = NUMERIC_DATE_RE.captures(s) {
        return Some(format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1]));
    }

    if let Some(caps) = NAMED_MONTH_RE.captures(s) {
        if let Some(month) = month_number(&caps[2]) {
            return Some(format!("{}-{:02}-{:0>2}", &caps[3], month, &caps[1]));
        }
    }

    EMBEDDED_ISO_RE.captures(s).map(|caps| caps[1].to_string())
}

/// A line counts as a date line when it resolves to a date or carries one of
/// the raw notations anywhere inline.
pub fn is_date_line(line: &str) -> bool {
    to_iso_date(line).is_some() || INLINE_DATE_RE.is_match(line)
}

fn month_number(name: &str) -> Option<usize> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    MONTHS.iter().position(|m| *m == prefix).map(|i| i + 1)
}
