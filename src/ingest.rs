use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::{self, CalendarEntry, NoticeRecord, ScheduleRecord};
use crate::decode::{decode, Decoded, Format};
use crate::error::IngestError;
use crate::parser::{self, DocumentMeta};

type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Timetable,
    Calendar,
    Notice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub format: Format,
    pub kind: DocumentKind,
}

/// Pick the decoder and parse path from the file name. `None` means the file
/// is not ingestible.
pub fn route(path: &Path) -> Option<Route> {
    let format = Format::from_path(path)?;
    let name = file_name(path).to_lowercase();
    let kind = match format {
        Format::Spreadsheet => DocumentKind::Timetable,
        Format::Docx => DocumentKind::Notice,
        Format::Pdf | Format::Text if name.contains("calendar") => DocumentKind::Calendar,
        Format::Pdf | Format::Text => DocumentKind::Timetable,
    };
    Some(Route { format, kind })
}

const DEPARTMENT_HINTS: &[(&str, &str)] = &[
    ("cs", "CS"),
    ("ins", "INS"),
    ("ict", "ICT"),
    ("tel", "TEL"),
    ("cps", "CPS"),
];

/// First department hint found in the lowercase file name, else `UNKNOWN`.
pub fn guess_department(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    DEPARTMENT_HINTS
        .iter()
        .find(|(hint, _)| lower.contains(hint))
        .map(|(_, dept)| *dept)
        .unwrap_or("UNKNOWN")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum Records {
    Schedule(Vec<ScheduleRecord>),
    Calendar(Vec<CalendarEntry>),
    Notices(Vec<NoticeRecord>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Schedule(r) => r.len(),
            Records::Calendar(r) => r.len(),
            Records::Notices(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    pub source_key: String,
    #[serde(flatten)]
    pub records: Records,
}

/// Decode and parse one file. Each call owns its own parse state, so calls
/// can run in parallel. `kind` overrides the name-based route.
pub fn parse_file(
    path: &Path,
    term: &str,
    kind: Option<DocumentKind>,
) -> Result<Option<ParsedDocument>> {
    let Some(mut route) = route(path) else {
        return Ok(None);
    };
    if let Some(kind) = kind {
        route.kind = kind;
    }

    let source_key = file_name(path);
    let meta = DocumentMeta {
        department: guess_department(&source_key).to_string(),
        source_key: source_key.clone(),
        term: term.to_string(),
    };

    let records = match (route.kind, decode(path, route.format)?) {
        (DocumentKind::Timetable, Decoded::Rows(rows)) => {
            Records::Schedule(parser::parse_sheet(&rows, &meta))
        }
        (DocumentKind::Timetable, Decoded::Text(text)) => {
            Records::Schedule(parser::parse_timetable(&text, &meta))
        }
        (DocumentKind::Calendar, Decoded::Text(text)) => {
            Records::Calendar(parser::parse_calendar(&text, &meta))
        }
        (DocumentKind::Notice, Decoded::Text(text)) => {
            let today = chrono::Local::now().format("%Y-%m-%d").to_string();
            Records::Notices(vec![parser::parse_notice(&text, &today, &meta)])
        }
        (kind, Decoded::Rows(_)) => {
            return Err(IngestError::extraction(
                path,
                format!("spreadsheets cannot be parsed as {:?}", kind),
            ))
        }
    };

    Ok(Some(ParsedDocument { source_key, records }))
}

/// Hand one document's records to the sink, replacing what was stored for it.
pub fn persist(conn: &Connection, doc: &ParsedDocument, term: &str) -> Result<usize> {
    match &doc.records {
        Records::Schedule(rows) => db::replace_schedule(conn, &doc.source_key, term, rows),
        Records::Calendar(rows) => db::replace_calendar(conn, &doc.source_key, term, rows),
        Records::Notices(rows) => db::replace_notices(conn, &doc.source_key, term, rows),
    }
}

#[derive(Debug, Default)]
pub struct IngestSummary {
    pub schedule: usize,
    pub calendar: usize,
    pub notices: usize,
    pub skipped: usize,
    /// (file name, error) for documents that could not be extracted.
    pub failed: Vec<(String, String)>,
}

impl IngestSummary {
    fn record(&mut self, records: &Records) {
        match records {
            Records::Schedule(r) => self.schedule += r.len(),
            Records::Calendar(r) => self.calendar += r.len(),
            Records::Notices(r) => self.notices += r.len(),
        }
    }

    pub fn print(&self) {
        println!(
            "Saved {} timetable rows, {} calendar entries, {} notices ({} skipped, {} failed).",
            self.schedule,
            self.calendar,
            self.notices,
            self.skipped,
            self.failed.len(),
        );
        for (file, err) in &self.failed {
            println!("  failed: {} ({})", file, err);
        }
    }
}

/// Ingest every file in `dir`. Files are parsed in parallel chunks and
/// persisted in name order. A document that fails to decode is logged and
/// skipped; a database failure aborts the run.
pub fn ingest_dir(
    conn: &Connection,
    dir: &Path,
    term: &str,
    batch_size: usize,
) -> Result<IngestSummary> {
    let files = list_files(dir)?;
    let mut summary = IngestSummary::default();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    for chunk in files.chunks(batch_size.max(1)) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| (path, parse_file(path, term, None)))
            .collect();

        for (path, result) in results {
            let name = file_name(path);
            match result {
                Ok(None) => {
                    info!("Skipping {}", name);
                    summary.skipped += 1;
                }
                Ok(Some(doc)) => {
                    let saved = persist(conn, &doc, term)?;
                    info!(file = %name, rows = saved, "ingested");
                    summary.record(&doc.records);
                }
                Err(e) if e.is_document_local() => {
                    warn!(file = %name, error = %e, "extraction failed");
                    summary.failed.push((name, e.to_string()));
                }
                Err(e) => return Err(e),
            }
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
    Ok(summary)
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
