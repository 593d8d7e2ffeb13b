use std::sync::LazyLock;

use regex::Regex;

use super::dates::parse_time_range;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^((?:MON|TUES|WEDNES|THURS|FRI|SATUR|SUN)DAYS?)\b.*?\d{1,2}:\d{2}").unwrap()
});

const DAY_TABLE: &[(&str, &str)] = &[
    ("MONDAY", "Mon"),
    ("TUESDAY", "Tue"),
    ("WEDNESDAY", "Wed"),
    ("THURSDAY", "Thu"),
    ("FRIDAY", "Fri"),
    ("SATURDAY", "Sat"),
    ("SUNDAY", "Sun"),
];

/// A weekday + time line, e.g. `MONDAYS 08:30 - 11:00`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub day3: &'static str,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// The day/time in force for data rows until the next header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayTimeContext {
    pub day3: Option<&'static str>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl DayTimeContext {
    /// Missing times in the header leave the previous values in place.
    pub fn apply(&mut self, header: Header) {
        self.day3 = Some(header.day3);
        if let Some(start) = header.start_time {
            self.start_time = Some(start);
        }
        if let Some(end) = header.end_time {
            self.end_time = Some(end);
        }
    }
}

pub fn is_header(line: &str) -> bool {
    HEADER_RE.is_match(line)
}

pub fn detect_header(line: &str) -> Option<Header> {
    let caps = HEADER_RE.captures(line)?;
    let day3 = day3(&caps[1])?;
    let (start_time, end_time) = match parse_time_range(line) {
        Some((s, e)) => (Some(s), Some(e)),
        None => (None, None),
    };
    Some(Header {
        day3,
        start_time,
        end_time,
    })
}

/// Map a weekday name (any case, singular or plural) to its 3-letter form.
pub fn day3(token: &str) -> Option<&'static str> {
    let upper = token.trim().to_uppercase();
    let singular = upper.strip_suffix('S').unwrap_or(&upper);
    DAY_TABLE
        .iter()
        .find(|(name, _)| *name == singular || *name == upper)
        .map(|(_, short)| *short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_header() {
        let h = detect_header("MONDAYS 08:30 - 11:00").unwrap();
        assert_eq!(h.day3, "Mon");
        assert_eq!(h.start_time.as_deref(), Some("08:30"));
        assert_eq!(h.end_time.as_deref(), Some("11:00"));
    }

    #[test]
    fn mixed_case_with_trailing_text() {
        let h = detect_header("Thursday   2:00 - 4:00   (Lecture Block)").unwrap();
        assert_eq!(h.day3, "Thu");
        assert_eq!(h.start_time.as_deref(), Some("02:00"));
        assert_eq!(h.end_time.as_deref(), Some("04:00"));
    }

    #[test]
    fn header_without_range_keeps_day() {
        let h = detect_header("FRIDAYS from 9:00").unwrap();
        assert_eq!(h.day3, "Fri");
        assert_eq!(h.start_time, None);
        assert_eq!(h.end_time, None);
    }

    #[test]
    fn not_a_header() {
        assert!(detect_header("ICT 202   Data Structures").is_none());
        assert!(detect_header("MONDAYS").is_none());
        assert!(detect_header("Mondayschool 08:00 - 09:00").is_none());
        assert!(!is_header("Venue: MONDAYS 08:30 - 11:00"));
    }

    #[test]
    fn day_table() {
        assert_eq!(day3("WEDNESDAYS"), Some("Wed"));
        assert_eq!(day3("saturday"), Some("Sat"));
        assert_eq!(day3("Sun"), None);
        assert_eq!(day3("Holiday"), None);
    }

    #[test]
    fn context_retains_missing_times() {
        let mut ctx = DayTimeContext::default();
        ctx.apply(detect_header("MONDAYS 08:30 - 11:00").unwrap());
        ctx.apply(detect_header("TUESDAYS at 9:00").unwrap());
        assert_eq!(ctx.day3, Some("Tue"));
        assert_eq!(ctx.start_time.as_deref(), Some("08:30"));
        assert_eq!(ctx.end_time.as_deref(), Some("11:00"));
    }
}
