use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "campus_ingest.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    /// Opaque term/semester tag stamped on every stored row.
    pub term: String,
    /// Files parsed per parallel chunk during batch ingestion.
    pub batch_size: usize,
}

/// Defaults, then the TOML file, then `CAMPUS_*` environment variables.
pub fn load(file: Option<&Path>) -> Result<Settings> {
    let builder = Config::builder()
        .set_default("db_path", "tmp/campus.sqlite")?
        .set_default("data_dir", "data")?
        .set_default("term", "2025-2026 S1")?
        .set_default("batch_size", 64_i64)?;

    let builder = match file {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
    };

    let settings: Settings = builder
        .add_source(Environment::with_prefix("CAMPUS").try_parsing(true))
        .build()
        .context("Failed to load configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    anyhow::ensure!(settings.batch_size > 0, "batch_size must be at least 1");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let s = load(None).unwrap();
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert_eq!(s.term, "2025-2026 S1");
        assert!(s.batch_size > 0);
    }

    #[test]
    fn file_overrides_defaults() {
        let s = load(Some(Path::new("tests/fixtures/campus_ingest.toml"))).unwrap();
        assert_eq!(s.term, "2026-2027 S2");
        assert_eq!(s.db_path, PathBuf::from("tmp/test.sqlite"));
        assert_eq!(s.batch_size, 8);
        assert_eq!(s.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load(Some(Path::new("tests/fixtures/nope.toml"))).is_err());
    }
}
