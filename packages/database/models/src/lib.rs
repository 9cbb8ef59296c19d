#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Query parameter types for the population registry and crime-event
//! store.
//!
//! These describe what the stores are asked for. They are distinct from
//! the derived result types in `crime_rate_analytics_models`.

use std::collections::BTreeSet;

use crime_rate_crime_models::{CrimeEvent, CrimeTypeFilter};
use crime_rate_geography_models::LocationId;
use serde::{Deserialize, Serialize};

/// Filter for summing crime counts in the event store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    /// Restrict to these locations. `None` means every location.
    pub location_ids: Option<BTreeSet<LocationId>>,
    /// Year token that must appear somewhere in the event date.
    pub year: String,
    /// Crime type restriction.
    pub crime_type: CrimeTypeFilter,
}

impl EventFilter {
    /// Creates a filter over every location for `year`.
    #[must_use]
    pub fn for_year(year: impl Into<String>) -> Self {
        Self {
            location_ids: None,
            year: year.into(),
            crime_type: CrimeTypeFilter::All,
        }
    }

    /// Restricts the filter to `ids`.
    #[must_use]
    pub fn with_locations(mut self, ids: BTreeSet<LocationId>) -> Self {
        self.location_ids = Some(ids);
        self
    }

    /// Restricts the filter to crime types matching `crime_type`.
    #[must_use]
    pub fn with_crime_type(mut self, crime_type: CrimeTypeFilter) -> Self {
        self.crime_type = crime_type;
        self
    }

    /// Returns `true` if the location restriction (if any) admits `id`.
    #[must_use]
    pub fn admits_location(&self, id: LocationId) -> bool {
        self.location_ids.as_ref().is_none_or(|ids| ids.contains(&id))
    }

    /// Returns `true` if `event` passes the location and year checks.
    ///
    /// The crime type check is left to the store, which decides how
    /// labels are folded for comparison.
    #[must_use]
    pub fn admits_location_and_year(&self, event: &CrimeEvent) -> bool {
        self.admits_location(LocationId(event.location_id)) && event.in_year(&self.year)
    }
}
