use super::codes::{expand_codes, is_course_code};
use super::dates::normalize_time;
use super::header::day3;
use super::DocumentMeta;
use crate::db::ScheduleRecord;

const CODE: &[&str] = &["course_code", "course", "course code", "code"];
const TITLE: &[&str] = &["course_title", "title", "course title"];
const DAY: &[&str] = &["day"];
const START: &[&str] = &["start_time", "start"];
const END: &[&str] = &["end_time", "end"];
const VENUE: &[&str] = &["venue", "room", "hall"];
const LECTURER: &[&str] = &["lecturer", "instructor", "teacher"];

const SHORT_DAYS: &[&str] = &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

struct Columns {
    code: Option<usize>,
    title: Option<usize>,
    day: Option<usize>,
    start: Option<usize>,
    end: Option<usize>,
    venue: Option<usize>,
    lecturer: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Self {
        let normalized: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
        };
        Columns {
            code: find(CODE),
            title: find(TITLE),
            day: find(DAY),
            start: find(START),
            end: find(END),
            venue: find(VENUE),
            lecturer: find(LECTURER),
        }
    }
}

/// Spreadsheet timetables: the first row names the columns. Rows missing a
/// code, day, start or end are dropped, as are rows whose day or times do not
/// normalize. A `/`-joined code cell yields one record per valid code.
pub fn parse_rows(rows: &[Vec<String>], meta: &DocumentMeta) -> Vec<ScheduleRecord> {
    let Some((header, body)) = rows.split_first() else {
        return Vec::new();
    };
    let cols = Columns::from_header(header);

    body.iter()
        .flat_map(|row| {
            let cell = |idx: Option<usize>| -> String {
                idx.and_then(|i| row.get(i))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            };

            let code = cell(cols.code);
            let day = cell(cols.day);
            let start = cell(cols.start);
            let end = cell(cols.end);
            if code.is_empty() || day.is_empty() || start.is_empty() || end.is_empty() {
                return Vec::new();
            }
            let (Some(weekday), Some(start_time), Some(end_time)) =
                (normalize_day(&day), normalize_time(&start), normalize_time(&end))
            else {
                return Vec::new();
            };

            let title = cell(cols.title);
            let venue = cell(cols.venue);
            let lecturer = cell(cols.lecturer);
            expand_codes(&code)
                .into_iter()
                .filter(|c| is_course_code(c))
                .map(|c| ScheduleRecord {
                    department: meta.department.clone(),
                    course_code: c.to_string(),
                    course_title: title.clone(),
                    day3: weekday.to_string(),
                    start_time: start_time.clone(),
                    end_time: end_time.clone(),
                    venue: venue.clone(),
                    lecturer: lecturer.clone(),
                    source_key: meta.source_key.clone(),
                    term: meta.term.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn normalize_day(raw: &str) -> Option<&'static str> {
    day3(raw).or_else(|| SHORT_DAYS.iter().find(|d| d.eq_ignore_ascii_case(raw)).copied())
}
