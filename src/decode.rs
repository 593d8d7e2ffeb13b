use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use quick_xml::events::Event;
use tracing::debug;

use crate::error::IngestError;

type Result<T> = std::result::Result<T, IngestError>;
type XmlResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Spreadsheet,
    Docx,
    /// Text already extracted by some other tool.
    Text,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Format::Pdf),
            "xlsx" | "xls" => Some(Format::Spreadsheet),
            "docx" => Some(Format::Docx),
            "txt" => Some(Format::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Text(String),
    Rows(Vec<Vec<String>>),
}

pub fn decode(path: &Path, format: Format) -> Result<Decoded> {
    debug!(path = %path.display(), ?format, "decoding");
    match format {
        Format::Pdf => {
            let bytes = read_bytes(path)?;
            let text = pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| IngestError::extraction(path, e))?;
            Ok(Decoded::Text(text))
        }
        Format::Spreadsheet => first_sheet_rows(path).map(Decoded::Rows),
        Format::Docx => docx_text(path).map(Decoded::Text),
        Format::Text => {
            let bytes = read_bytes(path)?;
            Ok(Decoded::Text(String::from_utf8_lossy(&bytes).into_owned()))
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Spreadsheets ──

fn first_sheet_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::extraction(path, e))?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::extraction(path, "workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| IngestError::extraction(path, e))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // time-only cells are stored as a fraction of a day
        Data::Float(f) if (0.0..1.0).contains(f) => day_fraction_to_hhmm(*f),
        Data::DateTime(dt) if (0.0..1.0).contains(&dt.as_f64()) => day_fraction_to_hhmm(dt.as_f64()),
        other => other.to_string().trim().to_string(),
    }
}

fn day_fraction_to_hhmm(fraction: f64) -> String {
    let minutes = (fraction * 24.0 * 60.0).round() as u32;
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

// ── DOCX ──

fn docx_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| IngestError::extraction(path, e))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| IngestError::extraction(path, e))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::extraction(path, e))?;
    paragraphs_from_document_xml(&xml).map_err(|e| IngestError::extraction(path, e))
}

/// One output line per `<w:p>`, text taken from `<w:t>` runs.
fn paragraphs_from_document_xml(xml: &str) -> XmlResult<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => current.push_str(&e.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("data/ICT.PDF")), Some(Format::Pdf));
        assert_eq!(Format::from_path(Path::new("cs.xlsx")), Some(Format::Spreadsheet));
        assert_eq!(Format::from_path(Path::new("old.xls")), Some(Format::Spreadsheet));
        assert_eq!(Format::from_path(Path::new("notice.docx")), Some(Format::Docx));
        assert_eq!(Format::from_path(Path::new("calendar.txt")), Some(Format::Text));
        assert_eq!(Format::from_path(Path::new("photo.png")), None);
        assert_eq!(Format::from_path(Path::new("README")), None);
    }

    #[test]
    fn day_fractions() {
        assert_eq!(day_fraction_to_hhmm(0.354166667), "08:30");
        assert_eq!(day_fraction_to_hhmm(0.5), "12:00");
        assert_eq!(day_fraction_to_hhmm(0.0), "00:00");
    }

    #[test]
    fn cells() {
        assert_eq!(cell_text(&Data::String("  ICT 202 ".into())), "ICT 202");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(0.75)), "18:00");
    }

    #[test]
    fn docx_paragraphs() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Registration</w:t></w:r><w:r><w:t xml:space="preserve"> deadline</w:t></w:r></w:p>
    <w:p><w:r><w:t>Fees &amp; charges</w:t><w:tab/><w:t>due</w:t></w:r></w:p>
    <w:p/>
  </w:body>
</w:document>"#;
        let text = paragraphs_from_document_xml(xml).unwrap();
        assert_eq!(text, "Registration deadline\nFees & charges\tdue");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = decode(Path::new("tests/fixtures/does_not_exist.pdf"), Format::Pdf).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(err.is_document_local());
    }

    #[test]
    fn text_passthrough() {
        let decoded = decode(Path::new("tests/fixtures/academic_calendar.txt"), Format::Text).unwrap();
        assert!(matches!(decoded, Decoded::Text(t) if t.contains("Graduation Ceremony")));
    }
}
