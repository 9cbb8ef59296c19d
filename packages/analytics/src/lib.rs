#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Population-normalized crime rate aggregation and ranking engine.
//!
//! Joins the population registry with the crime-event store: resolves
//! place names to identifiers, sums crime counts for a year, divides by
//! population to get a rate per 100k, and ranks communes and regions by
//! that rate. Every result is recomputed from the stores on each call.

pub mod aggregate;
pub mod progress;
pub mod ranking;
pub mod rate;
pub mod registry;
pub mod session;

pub use session::Analyzer;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] crime_rate_database::DbError),

    /// The place name matched no location.
    #[error(transparent)]
    NotFound(#[from] crime_rate_geography::ResolveError),

    /// An aggregation was requested over zero locations.
    #[error("Refusing to aggregate over an empty location set")]
    EmptyLocationSet,
}

impl AnalyticsError {
    /// Returns `true` for errors that only abandon the current query.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::EmptyLocationSet)
    }
}
