use std::path::Path;

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::IngestError;

type Result<T> = std::result::Result<T, IngestError>;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| IngestError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sources (
            id          INTEGER PRIMARY KEY,
            source_file TEXT UNIQUE NOT NULL,
            type        TEXT NOT NULL CHECK(type IN ('timetable','calendar','notices')),
            term        TEXT,
            ingested_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS timetable (
            id           INTEGER PRIMARY KEY,
            dept         TEXT,
            course_code  TEXT NOT NULL,
            course_title TEXT,
            day          TEXT,
            start_time   TEXT,
            end_time     TEXT,
            venue        TEXT,
            lecturer     TEXT,
            source_file  TEXT NOT NULL,
            term         TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_timetable_source ON timetable(source_file);
        CREATE INDEX IF NOT EXISTS idx_timetable_day ON timetable(day);

        CREATE TABLE IF NOT EXISTS calendar (
            id          INTEGER PRIMARY KEY,
            date        TEXT,
            title       TEXT,
            description TEXT,
            source_file TEXT NOT NULL,
            term        TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_calendar_source ON calendar(source_file);

        CREATE TABLE IF NOT EXISTS notices (
            id          INTEGER PRIMARY KEY,
            date        TEXT,
            title       TEXT,
            body        TEXT,
            source_file TEXT NOT NULL,
            term        TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_notices_source ON notices(source_file);
        ",
    )?;
    Ok(())
}

// ── Records ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleRecord {
    pub department: String,
    pub course_code: String,
    pub course_title: String,
    pub day3: String,
    pub start_time: String,
    pub end_time: String,
    pub venue: String,
    pub lecturer: String,
    pub source_key: String,
    pub term: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub date: String,
    pub title: String,
    pub description: String,
    pub source_key: String,
    pub term: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoticeRecord {
    pub date: String,
    pub title: String,
    pub body: String,
    pub source_key: String,
    pub term: String,
}

// ── Replace-by-source writes ──

fn upsert_source(conn: &Connection, source_file: &str, kind: &str, term: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO sources (source_file, type, term) VALUES (?1, ?2, ?3)
         ON CONFLICT(source_file) DO UPDATE SET
             type = excluded.type, term = excluded.term, ingested_at = datetime('now')",
        params![source_file, kind, term],
    )?;
    Ok(())
}

/// Replace every timetable row stored for `source_file` with `rows`.
pub fn replace_schedule(
    conn: &Connection,
    source_file: &str,
    term: &str,
    rows: &[ScheduleRecord],
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        upsert_source(&tx, source_file, "timetable", term)?;
        tx.execute("DELETE FROM timetable WHERE source_file = ?1", [source_file])?;
        let mut stmt = tx.prepare(
            "INSERT INTO timetable
             (dept, course_code, course_title, day, start_time, end_time, venue, lecturer, source_file, term)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for r in rows {
            count += stmt.execute(params![
                r.department, r.course_code, r.course_title, r.day3, r.start_time,
                r.end_time, r.venue, r.lecturer, source_file, term,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn replace_calendar(
    conn: &Connection,
    source_file: &str,
    term: &str,
    rows: &[CalendarEntry],
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        upsert_source(&tx, source_file, "calendar", term)?;
        tx.execute("DELETE FROM calendar WHERE source_file = ?1", [source_file])?;
        let mut stmt = tx.prepare(
            "INSERT INTO calendar (date, title, description, source_file, term)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for r in rows {
            count += stmt.execute(params![r.date, r.title, r.description, source_file, term])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn replace_notices(
    conn: &Connection,
    source_file: &str,
    term: &str,
    rows: &[NoticeRecord],
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        upsert_source(&tx, source_file, "notices", term)?;
        tx.execute("DELETE FROM notices WHERE source_file = ?1", [source_file])?;
        let mut stmt = tx.prepare(
            "INSERT INTO notices (date, title, body, source_file, term)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for r in rows {
            count += stmt.execute(params![r.date, r.title, r.body, source_file, term])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Overview ──

pub struct OverviewRow {
    pub dept: String,
    pub course_code: String,
    pub course_title: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub venue: String,
    pub lecturer: String,
}

pub fn fetch_overview(
    conn: &Connection,
    day3: Option<&str>,
    dept: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(d) = day3 {
        conditions.push(format!("UPPER(SUBSTR(day, 1, 3)) = ?{}", params.len() + 1));
        params.push(Box::new(d.to_uppercase()));
    }
    if let Some(d) = dept {
        conditions.push(format!("UPPER(dept) = ?{}", params.len() + 1));
        params.push(Box::new(d.to_uppercase()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT COALESCE(dept,''), course_code, COALESCE(course_title,''), COALESCE(day,''),
                COALESCE(start_time,''), COALESCE(end_time,''), COALESCE(venue,''),
                COALESCE(lecturer,'')
         FROM timetable{}
         ORDER BY CASE day
             WHEN 'Mon' THEN 1 WHEN 'Tue' THEN 2 WHEN 'Wed' THEN 3 WHEN 'Thu' THEN 4
             WHEN 'Fri' THEN 5 WHEN 'Sat' THEN 6 WHEN 'Sun' THEN 7 ELSE 8 END,
             start_time, course_code
         LIMIT {}",
        where_clause, limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(OverviewRow {
                dept: row.get(0)?,
                course_code: row.get(1)?,
                course_title: row.get(2)?,
                day: row.get(3)?,
                start_time: row.get(4)?,
                end_time: row.get(5)?,
                venue: row.get(6)?,
                lecturer: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub sources: usize,
    pub timetable: usize,
    pub calendar: usize,
    pub notices: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |table: &str| -> Result<usize> {
        let n: usize = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(n)
    };
    Ok(Stats {
        sources: count("sources")?,
        timetable: count("timetable")?,
        calendar: count("calendar")?,
        notices: count("notices")?,
    })
}
