pub mod calendar;
pub mod codes;
pub mod columns;
pub mod dates;
pub mod fields;
pub mod header;
pub mod lines;
pub mod notice;
pub mod rows;
pub mod sheet;

use serde::Serialize;

use crate::db::{CalendarEntry, ScheduleRecord};
use rows::RowReconstructor;

pub use notice::parse_notice;
pub use sheet::parse_rows as parse_sheet;

/// Values stamped onto every record of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub source_key: String,
    pub term: String,
    pub department: String,
}

/// Timetable path: lines → logical rows → chunks → records.
pub fn parse_timetable(text: &str, meta: &DocumentMeta) -> Vec<ScheduleRecord> {
    let lines = lines::normalize(text);
    RowReconstructor::new(&lines)
        .flat_map(|row| fields::extract(&row, meta))
        .collect()
}

/// Calendar path: lines → date/title/description blocks.
pub fn parse_calendar(text: &str, meta: &DocumentMeta) -> Vec<CalendarEntry> {
    let lines = lines::trimmed(text);
    calendar::segment(&lines, meta)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    const DAYS: &[&str] = &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun", ""];

    fn meta() -> DocumentMeta {
        DocumentMeta {
            source_key: "ict_timetable.pdf".into(),
            term: "2025-2026 S1".into(),
            department: "ICT".into(),
        }
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
    }

    #[test]
    fn timetable_scenario() {
        let recs = parse_timetable(
            "MONDAYS 08:30 - 11:00\nICT 202   Data Structures   J. Doe   Hall A",
            &meta(),
        );
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.course_code, "ICT 202");
        assert_eq!(r.course_title, "Data Structures");
        assert_eq!(r.day3, "Mon");
        assert_eq!(r.start_time, "08:30");
        assert_eq!(r.end_time, "11:00");
        assert_eq!(r.venue, "Hall A");
        assert_eq!(r.lecturer, "J. Doe");
    }

    #[test]
    fn calendar_scenario() {
        let entries = parse_calendar("2025-11-03\nGraduation Ceremony\n\nOther line", &meta());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, "2025-11-03");
        assert_eq!(entries[0].title, "Graduation Ceremony");
        assert_eq!(entries[0].description, "");
    }

    #[test]
    fn header_scope_covers_following_rows() {
        let text = "TUESDAYS 11:00 - 13:00\n\
                    ICT 202   Data Structures   J. Doe   Hall A\n\
                    ICT 204   Networks   K. Mensah   Lab 2\n\
                    ICT 206   Databases   A. Boateng   Lab 3\n\
                    FRIDAYS 14:00 - 16:00\n\
                    ICT 208   Operating Systems   P. Asante   Hall B";
        let recs = parse_timetable(text, &meta());
        assert_eq!(recs.len(), 4);
        assert!(recs[..3].iter().all(|r| r.day3 == "Tue" && r.start_time == "11:00"));
        assert_eq!(recs[3].day3, "Fri");
        assert_eq!(recs[3].end_time, "16:00");
    }

    #[test]
    fn idempotent() {
        let text = fixture("ict_timetable.txt");
        assert_eq!(parse_timetable(&text, &meta()), parse_timetable(&text, &meta()));
        let cal = fixture("academic_calendar.txt");
        assert_eq!(parse_calendar(&cal, &meta()), parse_calendar(&cal, &meta()));
    }

    #[test]
    fn fixture_invariants() {
        let code_re = Regex::new(r"^[A-Z]{2,4}\s*\d{3}$").unwrap();
        let time_re = Regex::new(r"^(\d{2}:\d{2})?$").unwrap();
        let recs = parse_timetable(&fixture("ict_timetable.txt"), &meta());
        assert!(!recs.is_empty());
        for r in &recs {
            assert!(DAYS.contains(&r.day3.as_str()), "bad day3: {:?}", r);
            assert!(time_re.is_match(&r.start_time), "bad start: {:?}", r);
            assert!(time_re.is_match(&r.end_time), "bad end: {:?}", r);
            assert!(code_re.is_match(&r.course_code), "bad code: {:?}", r);
        }
    }

    #[test]
    fn fixture_timetable() {
        let recs = parse_timetable(&fixture("ict_timetable.txt"), &meta());
        let codes: Vec<&str> = recs.iter().map(|r| r.course_code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                "ICT 202", "ICT 204", "CPS 416", "CPS 313", "ICT 206", "ICT 208", "INS 210",
                "TEL 212",
            ]
        );

        let cps: Vec<_> = recs.iter().filter(|r| r.course_code.starts_with("CPS")).collect();
        assert_eq!(cps[0].course_title, cps[1].course_title);
        assert_eq!(cps[0].venue, "Main Auditorium");

        let wrapped = recs.iter().find(|r| r.course_code == "ICT 206").unwrap();
        assert_eq!(wrapped.day3, "Wed");
        assert_eq!(wrapped.start_time, "14:00");
        assert_eq!(wrapped.venue, "Lab 3");

        let packed = recs.iter().find(|r| r.course_code == "TEL 212").unwrap();
        assert_eq!(packed.course_title, "Signals");
        assert_eq!(packed.day3, "Fri");
    }

    #[test]
    fn fixture_calendar() {
        let entries = parse_calendar(&fixture("academic_calendar.txt"), &meta());
        let dates: Vec<&str> = entries.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(
            dates,
            vec!["2025-09-01", "2025-09-08", "2025-11-03", "", "2026-01-12"]
        );
        assert_eq!(entries[1].title, "Lectures Begin");
        assert_eq!(
            entries[1].description,
            "All continuing and fresh students report to their departments."
        );
        assert_eq!(entries[3].title, "First Semester Examinations");
    }

    #[test]
    fn lines_without_codes_never_yield_records() {
        let text = "MONDAYS 08:30 - 11:00\nDepartment of Computer Science\nBreak\nPage 2";
        assert!(parse_timetable(text, &meta()).is_empty());
    }
}
