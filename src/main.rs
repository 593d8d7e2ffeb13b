mod db;
mod decode;
mod error;
mod ingest;
mod parser;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use ingest::{DocumentKind, Records};

#[derive(Parser)]
#[command(name = "campus_ingest", about = "Turn timetable, calendar and notice documents into SQLite rows")]
struct Cli {
    /// Config file (default: ./campus_ingest.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every document in a directory and store the records
    Ingest {
        /// Directory to scan (default: data_dir from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Term tag stamped on stored rows
        #[arg(short, long)]
        term: Option<String>,
    },
    /// Parse one document and print its records without storing them
    Parse {
        file: PathBuf,
        #[arg(short, long)]
        term: Option<String>,
        /// Force a document kind instead of routing by file name
        #[arg(short, long, value_enum)]
        kind: Option<DocumentKind>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show row counts per table
    Stats,
    /// Timetable overview, ordered by day and start time
    Overview {
        /// Filter by day (e.g. Mon, tuesday)
        #[arg(short, long)]
        day: Option<String>,
        /// Filter by department (e.g. ICT)
        #[arg(long)]
        dept: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Ingest { dir, term } => {
            let dir = dir.unwrap_or_else(|| settings.data_dir.clone());
            let term = term.unwrap_or_else(|| settings.term.clone());
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;

            println!("Ingesting {} (term {})...", dir.display(), term);
            let summary = ingest::ingest_dir(&conn, &dir, &term, settings.batch_size)?;
            summary.print();
            Ok(())
        }
        Commands::Parse { file, term, kind, json } => {
            let term = term.unwrap_or_else(|| settings.term.clone());
            let Some(doc) = ingest::parse_file(&file, &term, kind)? else {
                println!("Unsupported file type: {}", file.display());
                return Ok(());
            };

            if doc.records.is_empty() {
                println!("No records found in {}", doc.source_key);
            } else if json {
                let out = serde_json::to_string_pretty(&doc).context("Failed to serialize records")?;
                println!("{}", out);
            } else {
                print_records(&doc.records);
                println!("\n{} records from {}", doc.records.len(), doc.source_key);
            }
            Ok(())
        }
        Commands::Overview { day, dept, limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let day3 = day.as_deref().map(|d| d.get(..3).unwrap_or(d));
            let rows = db::fetch_overview(&conn, day3, dept.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No timetable rows found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<5} | {:<10} | {:<28} | {:<3} | {:<11} | {:<16} | {:<18}",
                "#", "Dept", "Code", "Title", "Day", "Time", "Venue", "Lecturer"
            );
            println!("{}", "-".repeat(112));

            for (i, r) in rows.iter().enumerate() {
                println!(
                    "{:>3} | {:<5} | {:<10} | {:<28} | {:<3} | {:<11} | {:<16} | {:<18}",
                    i + 1,
                    r.dept,
                    r.course_code,
                    truncate(&r.course_title, 28),
                    r.day,
                    format!("{}-{}", r.start_time, r.end_time),
                    truncate(&r.venue, 16),
                    truncate(&r.lecturer, 18),
                );
            }

            println!("\n{} rows", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Sources:   {}", s.sources);
            println!("Timetable: {}", s.timetable);
            println!("Calendar:  {}", s.calendar);
            println!("Notices:   {}", s.notices);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_records(records: &Records) {
    match records {
        Records::Schedule(rows) => {
            for r in rows {
                println!(
                    "{:<10} | {:<3} {}-{} | {:<28} | {:<16} | {}",
                    r.course_code,
                    r.day3,
                    r.start_time,
                    r.end_time,
                    truncate(&r.course_title, 28),
                    truncate(&r.venue, 16),
                    r.lecturer
                );
            }
        }
        Records::Calendar(entries) => {
            for e in entries {
                println!("{:<10} | {}", e.date, e.title);
                if !e.description.is_empty() {
                    println!("{:<10}   {}", "", truncate(&e.description, 80));
                }
            }
        }
        Records::Notices(notices) => {
            for n in notices {
                println!("{} ({})\n{}", n.title, n.date, n.body);
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
