#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Access to the population registry and the crime-event store.
//!
//! The analysis core only ever talks to the two store traits defined here,
//! [`PopulationRegistry`] and [`CrimeEventStore`], and receives them as
//! `&dyn` handles. [`db::DuckDbStore`] backs both with a single `DuckDB`
//! file; [`memory`] holds them in process for tests and small snapshots.

pub mod db;
pub mod events_db;
pub mod memory;
pub mod paths;
pub mod registry_db;

use std::collections::BTreeMap;

use crime_rate_database_models::EventFilter;
use crime_rate_geography_models::LocationId;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A store could not be reached or opened.
    #[error("Store unreachable: {message}")]
    Connectivity {
        /// Description of what went wrong.
        message: String,
    },

    /// `DuckDB` query error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Key-value registry of communes and their population.
///
/// Keys are integer location identifiers rendered as strings; values are
/// serialized registry records, decoded by
/// `crime_rate_geography_models::LocationRecord::decode`.
pub trait PopulationRegistry {
    /// Checks that the registry is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connectivity`] if it is not.
    fn ping(&self) -> Result<(), DbError>;

    /// Enumerates every key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the registry cannot be read.
    fn keys(&self) -> Result<Vec<String>, DbError>;

    /// Returns the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the registry cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, DbError>;
}

/// Collection of crime events supporting grouped sums.
pub trait CrimeEventStore {
    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connectivity`] if it is not.
    fn ping(&self) -> Result<(), DbError>;

    /// Sums `crime_count` over every event matching `filter`. Returns 0
    /// when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn sum_counts(&self, filter: &EventFilter) -> Result<u64, DbError>;

    /// Sums `crime_count` per location over every event matching
    /// `filter`, in one pass. Locations without matching events are
    /// absent from the map.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn sum_counts_by_location(
        &self,
        filter: &EventFilter,
    ) -> Result<BTreeMap<LocationId, u64>, DbError>;
}

/// Folds a crime type label or pattern for comparison.
///
/// Both stores apply this to the label and the pattern so that filtering
/// is case- and accent-insensitive.
#[must_use]
pub fn fold_crime_type(label: &str) -> String {
    crime_rate_geography::normalize::normalize(label)
}

/// Converts a stored count to `u64`, rejecting negatives.
///
/// # Errors
///
/// Returns [`DbError::Conversion`] if `value` is negative.
pub fn count_from_i64(value: i64) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::Conversion {
        message: format!("negative crime count {value}"),
    })
}
