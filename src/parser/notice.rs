use std::path::Path;

use super::lines;
use super::DocumentMeta;
use crate::db::NoticeRecord;

/// A notice document becomes one record titled after its file stem.
pub fn parse_notice(text: &str, date: &str, meta: &DocumentMeta) -> NoticeRecord {
    let title = Path::new(&meta.source_key)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&meta.source_key)
        .to_string();

    NoticeRecord {
        date: date.to_string(),
        title,
        body: lines::normalize(text).join("\n"),
        source_key: meta.source_key.clone(),
        term: meta.term.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_record_per_document() {
        let meta = DocumentMeta {
            source_key: "Exam Registration.docx".into(),
            term: "2025-2026 S1".into(),
            department: String::new(),
        };
        let n = parse_notice("  Registration closes Friday.  \n\n\nLate fees apply.\n", "2025-10-15", &meta);
        assert_eq!(n.title, "Exam Registration");
        assert_eq!(n.body, "Registration closes Friday.\nLate fees apply.");
        assert_eq!(n.date, "2025-10-15");
        assert_eq!(n.source_key, "Exam Registration.docx");
    }
}
