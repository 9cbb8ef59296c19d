#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place name normalization and location resolution.
//!
//! Resolves a free-text commune or region name into the set of registry
//! identifiers it refers to, using accent- and case-insensitive substring
//! matching.

pub mod normalize;
pub mod resolver;

use crime_rate_geography_models::LocationKind;
use thiserror::Error;

/// Errors that can occur while resolving a place name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No registry entry matched the query.
    #[error("No {kind} matches '{query}'")]
    NotFound {
        /// The query as typed.
        query: String,
        /// Which name field was searched.
        kind: LocationKind,
    },
}
