use tracing::debug;

use super::dates::{is_date_line, to_iso_date};
use super::lines::collapse_whitespace;
use super::DocumentMeta;
use crate::db::CalendarEntry;

/// Group trimmed lines (blank lines kept as `""`) into date/title/description
/// blocks.
pub fn segment(lines: &[&str], meta: &DocumentMeta) -> Vec<CalendarEntry> {
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !is_date_line(lines[i]) {
            i += 1;
            continue;
        }

        let date = to_iso_date(lines[i]).unwrap_or_default();
        let mut j = i + 1;

        // Title: first non-blank line before another date line.
        let mut title = "";
        while j < lines.len() && !is_date_line(lines[j]) {
            let candidate = lines[j];
            j += 1;
            if !candidate.is_empty() {
                title = candidate;
                break;
            }
        }

        // Description: up to a blank line (consumed) or the next date line.
        let mut parts = Vec::new();
        while j < lines.len() {
            let line = lines[j];
            if line.is_empty() {
                j += 1;
                break;
            }
            if is_date_line(line) {
                break;
            }
            parts.push(line);
            j += 1;
        }

        if date.is_empty() && title.is_empty() {
            debug!(line = lines[i], "date line without a usable date or title");
        } else {
            entries.push(CalendarEntry {
                date,
                title: title.to_string(),
                description: collapse_whitespace(&parts.join(" ")),
                source_key: meta.source_key.clone(),
                term: meta.term.clone(),
            });
        }
        i = j;
    }

    entries
}
