#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the `DuckDB` data directory.
//!
//! All paths are relative to the project root's `data/` directory unless
//! overridden by `CRIME_RATE_DB`.

use std::path::{Path, PathBuf};

/// Environment variable overriding [`default_db_path`].
pub const DB_PATH_ENV: &str = "CRIME_RATE_DB";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`, falling back to the
/// current directory for relocated binaries.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the default snapshot database path, `data/crime_rate.duckdb`.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().join("crime_rate.duckdb")
}

/// Returns the database path from `CRIME_RATE_DB`, or
/// [`default_db_path`].
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    std::env::var_os(DB_PATH_ENV).map_or_else(default_db_path, PathBuf::from)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
