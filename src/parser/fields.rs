use tracing::debug;

use super::codes::{expand_codes, is_code_list, is_course_code, split_by_codes, split_leading_codes};
use super::columns::{compact, split_columns};
use super::header::DayTimeContext;
use super::lines::collapse_whitespace;
use super::rows::ReconstructedRow;
use super::DocumentMeta;
use crate::db::ScheduleRecord;

/// Map one reconstructed row to schedule records: one per code chunk, and
/// one per `/`-joined code within a chunk.
pub fn extract(row: &ReconstructedRow, meta: &DocumentMeta) -> Vec<ScheduleRecord> {
    split_by_codes(&row.text)
        .into_iter()
        .flat_map(|chunk| extract_chunk(chunk, &row.context, meta))
        .collect()
}

fn extract_chunk(chunk: &str, ctx: &DayTimeContext, meta: &DocumentMeta) -> Vec<ScheduleRecord> {
    let Some(fields) = code_anchored_fields(chunk) else {
        debug!(chunk, "chunk does not start with a course code");
        return Vec::new();
    };

    let mut fields = fields.into_iter();
    let code = fields.next().unwrap_or_default();
    let title = fields.next().unwrap_or_default();
    let lecturer = fields.next().unwrap_or_default();
    let venue = collapse_whitespace(&fields.next().unwrap_or_default());

    expand_codes(&code)
        .into_iter()
        .filter(|c| is_course_code(c))
        .map(|c| ScheduleRecord {
            department: meta.department.clone(),
            course_code: c.to_string(),
            course_title: title.clone(),
            day3: ctx.day3.unwrap_or_default().to_string(),
            start_time: ctx.start_time.clone().unwrap_or_default(),
            end_time: ctx.end_time.clone().unwrap_or_default(),
            venue: venue.clone(),
            lecturer: lecturer.clone(),
            source_key: meta.source_key.clone(),
            term: meta.term.clone(),
        })
        .collect()
}

/// Columns of a chunk whose first field is a code list. A first field that
/// merely starts with codes has them peeled off into their own column.
fn code_anchored_fields(chunk: &str) -> Option<Vec<String>> {
    let fields = split_columns(chunk);
    let first = fields.first()?;
    if is_code_list(first) {
        return Some(fields);
    }

    let (codes, rest) = split_leading_codes(first)?;
    let mut peeled = vec![codes.to_string(), rest.to_string()];
    peeled.extend(fields.into_iter().skip(1));
    Some(compact(peeled))
}
