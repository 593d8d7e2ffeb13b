use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::codes::contains_code;
use super::columns::{column_count, EXPECTED_COLUMNS};
use super::header::{detect_header, is_header, DayTimeContext, Header};

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(s/?n|code|title|lecturer|venue)\b").unwrap());
static BARE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s*$").unwrap());
static SERIAL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s+").unwrap());

/// Text accumulated across wrapped physical lines for one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRow {
    text: String,
}

impl LogicalRow {
    fn seed(line: &str) -> Self {
        LogicalRow {
            text: line.to_string(),
        }
    }

    fn absorb(&mut self, line: &str) {
        self.text.push(' ');
        self.text.push_str(line.trim());
    }

    fn is_complete(&self) -> bool {
        column_count(&self.text) >= EXPECTED_COLUMNS
    }
}

/// A completed logical row with the day/time in force when it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedRow {
    pub text: String,
    pub context: DayTimeContext,
}

#[derive(Debug)]
enum LineKind<'a> {
    Header(Header),
    Marker,
    Data(&'a str),
    Noise,
}

fn classify(line: &str) -> LineKind<'_> {
    if let Some(header) = detect_header(line) {
        return LineKind::Header(header);
    }
    if MARKER_RE.is_match(line) || BARE_NUMBER_RE.is_match(line) {
        return LineKind::Marker;
    }
    let stripped = match SERIAL_PREFIX_RE.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    };
    if contains_code(stripped) {
        LineKind::Data(stripped)
    } else {
        LineKind::Noise
    }
}

enum State {
    Scanning,
    Accumulating(LogicalRow),
}

/// Two-state scanner over normalized timetable lines. Yields one
/// [`ReconstructedRow`] per data row; header lines only update the context.
pub struct RowReconstructor<'a> {
    lines: &'a [&'a str],
    pos: usize,
    context: DayTimeContext,
}

impl<'a> RowReconstructor<'a> {
    pub fn new(lines: &'a [&'a str]) -> Self {
        RowReconstructor {
            lines,
            pos: 0,
            context: DayTimeContext::default(),
        }
    }

    /// Stop absorbing once enough columns are present, the next line is a
    /// header, or input runs out.
    fn should_stop(&self, row: &LogicalRow) -> bool {
        row.is_complete()
            || self
                .lines
                .get(self.pos)
                .map_or(true, |next| is_header(next))
    }
}

impl Iterator for RowReconstructor<'_> {
    type Item = ReconstructedRow;

    fn next(&mut self) -> Option<ReconstructedRow> {
        let mut state = State::Scanning;
        loop {
            state = match state {
                State::Scanning => {
                    let line = *self.lines.get(self.pos)?;
                    self.pos += 1;
                    match classify(line) {
                        LineKind::Header(header) => {
                            self.context.apply(header);
                            State::Scanning
                        }
                        LineKind::Data(seed) => State::Accumulating(LogicalRow::seed(seed)),
                        LineKind::Marker | LineKind::Noise => {
                            trace!(line, "skipping non-data line");
                            State::Scanning
                        }
                    }
                }
                State::Accumulating(mut row) => {
                    if self.should_stop(&row) {
                        return Some(ReconstructedRow {
                            text: row.text,
                            context: self.context.clone(),
                        });
                    }
                    row.absorb(self.lines[self.pos]);
                    self.pos += 1;
                    State::Accumulating(row)
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<ReconstructedRow> {
        RowReconstructor::new(lines).collect()
    }

    #[test]
    fn complete_row_is_not_merged() {
        let out = rows(&[
            "MONDAYS 08:30 - 11:00",
            "ICT 202   Data Structures   J. Doe   Hall A",
            "ICT 204   Networks   K. Mensah   Lab 2",
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "ICT 202   Data Structures   J. Doe   Hall A");
        assert_eq!(out[0].context.day3, Some("Mon"));
        assert_eq!(out[1].context.start_time.as_deref(), Some("08:30"));
    }

    #[test]
    fn wrapped_row_is_merged() {
        let out = rows(&["ICT 202   Data Structures", "J. Doe   Hall A"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "ICT 202   Data Structures J. Doe   Hall A");
    }

    #[test]
    fn merge_stops_at_header() {
        let out = rows(&[
            "MONDAYS 08:30 - 11:00",
            "ICT 202   Data Structures",
            "TUESDAYS 11:00 - 13:00",
            "ICT 204   Networks   K. Mensah   Lab 2",
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "ICT 202   Data Structures");
        assert_eq!(out[0].context.day3, Some("Mon"));
        assert_eq!(out[1].context.day3, Some("Tue"));
        assert_eq!(out[1].context.start_time.as_deref(), Some("11:00"));
    }

    #[test]
    fn merge_stops_at_end_of_input() {
        let out = rows(&["ICT 202   Data Structures"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].context, DayTimeContext::default());
    }

    #[test]
    fn markers_and_numbering_skipped() {
        let out = rows(&[
            "S/N   CODE   TITLE   LECTURER   VENUE",
            "Code  Title  Lecturer  Venue",
            "1",
            "ICT 202   Data Structures   J. Doe   Hall A",
        ]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn serial_prefix_stripped() {
        let out = rows(&["12  ICT 202   Data Structures   J. Doe   Hall A"]);
        assert_eq!(out[0].text, "ICT 202   Data Structures   J. Doe   Hall A");
    }

    #[test]
    fn lines_without_codes_dropped() {
        let out = rows(&["UNIVERSITY OF SOMEWHERE", "Faculty timetable", "Page 1 of 4"]);
        assert!(out.is_empty());
    }

    #[test]
    fn context_carries_across_noise_and_headerless_stretches() {
        let out = rows(&[
            "WEDNESDAYS 14:00 - 16:00",
            "Page 1 of 2",
            "ICT 206   Databases   A. Boateng   Lab 3",
            "THURSDAYS only",
            "ICT 208   Operating Systems   P. Asante   Hall B",
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].context.day3, Some("Wed"));
        assert_eq!(out[1].context.day3, Some("Wed"));
        assert_eq!(out[1].context.end_time.as_deref(), Some("16:00"));
    }
}
