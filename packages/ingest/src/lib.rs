#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads the population and crime-event exports into a `DuckDB` snapshot.
//!
//! The registry gets one entry per distinct commune of the event export,
//! with its population taken from the projection file for the reference
//! year (0 when the projection has no figure). Both stores are replaced
//! wholesale on every load.

pub mod events;
pub mod interactive;
pub mod population;

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crime_rate_analytics::progress::{LogProgress, ProgressCallback};
use crime_rate_analytics_models::BatchSummary;
use crime_rate_database::{DbError, db::DuckDbStore};
use crime_rate_geography_models::{LocationId, LocationRecord};

use crate::events::Place;

/// Reference year of the population projection used by default.
pub const DEFAULT_POPULATION_YEAR: i32 = 2025;

/// Errors that abort a load.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// An input file could not be opened.
    #[error("Cannot open {path}: {source}")]
    Open {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// An input file is not readable CSV.
    #[error("Invalid {file} CSV: {source}")]
    Csv {
        /// Which export failed.
        file: &'static str,
        /// Underlying CSV error.
        source: csv::Error,
    },
    /// A registry value could not be serialized.
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
    /// The snapshot could not be written.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl IngestError {
    fn csv(file: &'static str) -> impl Fn(csv::Error) -> Self {
        move |source| Self::Csv { file, source }
    }
}

/// Input files and reference year for one load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Population projection CSV.
    pub population_path: PathBuf,
    /// Crime-event CSV.
    pub events_path: PathBuf,
    /// Year of the population figures to keep.
    pub population_year: i32,
}

/// Outcome of a completed load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Registry entries written.
    pub registry_entries: u64,
    /// Registry entries written with population 0 for lack of a figure.
    pub missing_population: usize,
    /// Events written.
    pub events: u64,
    /// Population rows read.
    pub population_summary: BatchSummary,
    /// Event rows read.
    pub event_summary: BatchSummary,
}

impl std::fmt::Display for LoadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} communes ({} without population) and {} events; \
             skipped {} population and {} event rows",
            self.registry_entries,
            self.missing_population,
            self.events,
            self.population_summary.skipped.len(),
            self.event_summary.skipped.len(),
        )
    }
}

/// Parses an identifier written either as an integer or as an integral
/// float (`1101.0`, as spreadsheet exports tend to do).
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if !f.is_finite() || f.fract() != 0.0 || f.abs() >= 9.0e15 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let n = f as i64;
    Some(n)
}

/// Like [`parse_id`] but rejects negatives.
pub(crate) fn parse_count(raw: &str) -> Option<u64> {
    parse_id(raw).and_then(|n| u64::try_from(n).ok())
}

/// Builds registry records for every place, joined with its population.
///
/// Returns the records and the number of places with no population figure.
#[must_use]
pub fn build_registry(
    places: &BTreeMap<i64, Place>,
    populations: &BTreeMap<i64, u64>,
    population_year: i32,
) -> (Vec<LocationRecord>, usize) {
    let mut missing = 0;
    let records = places
        .iter()
        .map(|(&id, place)| {
            let population = populations.get(&id).copied().unwrap_or_else(|| {
                log::debug!("No {population_year} population for commune {id}");
                missing += 1;
                0
            });
            LocationRecord {
                id: LocationId(id),
                commune: place.commune.clone(),
                region: place.region.clone(),
                population,
                population_year: Some(population_year),
            }
        })
        .collect();
    (records, missing)
}

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })
}

/// Reads both exports and replaces the snapshot contents.
///
/// # Errors
///
/// Returns [`IngestError`] if a file cannot be opened or parsed, or the
/// snapshot cannot be written. Individual malformed rows are skipped, not
/// errors.
pub fn load(
    store: &DuckDbStore,
    options: &LoadOptions,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<LoadReport, IngestError> {
    let start = Instant::now();
    let progress = progress.unwrap_or_else(|| LogProgress::new("Load", 100_000));
    let mut report = LoadReport::default();

    log::info!(
        "Reading {} population figures from {}",
        options.population_year,
        options.population_path.display()
    );
    let populations = population::read_population(
        open(&options.population_path)?,
        options.population_year,
        &mut report.population_summary,
    )?;
    report.population_summary.log("Population");

    log::info!("Reading events from {}", options.events_path.display());
    progress.set_message("Reading events".to_string());
    let parsed = events::read_events(
        open(&options.events_path)?,
        &mut report.event_summary,
        progress.as_ref(),
    )?;
    report.event_summary.log("Events");

    let (records, missing) = build_registry(&parsed.places, &populations, options.population_year);
    report.missing_population = missing;
    if missing > 0 {
        log::warn!("{missing} commune(s) have no population figure and were stored with 0");
    }

    let entries = records
        .iter()
        .map(|r| Ok((r.id.to_string(), r.encode_value()?)))
        .collect::<Result<Vec<_>, IngestError>>()?;

    progress.set_message("Writing snapshot".to_string());
    (report.registry_entries, report.events) = store.replace_snapshot(&entries, &parsed.events)?;

    progress.finish(format!(
        "{} communes, {} events",
        report.registry_entries, report.events
    ));
    log::info!(
        "Load complete: {} registry entries, {} events, took {:.1}s",
        report.registry_entries,
        report.events,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}
