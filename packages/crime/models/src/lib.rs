#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime event records, crime type filters, and severity tiers.
//!
//! A [`CrimeEvent`] is one row of the crime-event store: an aggregated
//! count of a single crime type for one location on one date. Rates
//! computed from these counts are classified into a [`SeverityTier`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Rate above which a location is classified [`SeverityTier::Critical`].
pub const CRITICAL_RATE: f64 = 2000.0;

/// Rate above which a location is classified [`SeverityTier::High`].
pub const HIGH_RATE: f64 = 1000.0;

/// Rate above which a location is classified [`SeverityTier::Medium`].
pub const MEDIUM_RATE: f64 = 500.0;

/// One record of the crime-event store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeEvent {
    /// Free-form date string. Only containment of a year token is ever
    /// checked against it.
    pub date: String,
    /// Crime type label as published by the source.
    pub crime_type: String,
    /// Number of crimes this record stands for (not necessarily 1).
    pub crime_count: u64,
    /// Location identifier. May not resolve to any registry entry.
    pub location_id: i64,
}

impl CrimeEvent {
    /// Returns `true` if the date field contains `year`.
    #[must_use]
    pub fn in_year(&self, year: &str) -> bool {
        self.date.contains(year)
    }
}

/// Coarse classification of a rate per 100k population.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityTier {
    /// Rate of at most 500 per 100k.
    Low,
    /// Rate above 500 and at most 1000 per 100k.
    Medium,
    /// Rate above 1000 and at most 2000 per 100k.
    High,
    /// Rate above 2000 per 100k.
    Critical,
}

impl SeverityTier {
    /// Classifies a rate per 100k population.
    ///
    /// Thresholds are strict: a rate of exactly 2000 is [`Self::High`],
    /// not [`Self::Critical`].
    #[must_use]
    pub fn from_rate(rate: f64) -> Self {
        if rate > CRITICAL_RATE {
            Self::Critical
        } else if rate > HIGH_RATE {
            Self::High
        } else if rate > MEDIUM_RATE {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Sentinel inputs that disable crime type filtering.
const UNFILTERED_SENTINELS: &[&str] = &["all", "todos"];

/// Crime type filter applied to [`CrimeEvent::crime_type`].
///
/// The pattern is stored as typed by the user; matching is a
/// case-insensitive substring test performed by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "pattern")]
pub enum CrimeTypeFilter {
    /// Every crime type counts.
    #[default]
    All,
    /// Only crime types containing this pattern count.
    Containing(String),
}

impl CrimeTypeFilter {
    /// Parses user input. Blank input and the sentinels `all`/`todos`
    /// (any case) disable the filter.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty()
            || UNFILTERED_SENTINELS
                .iter()
                .any(|s| trimmed.eq_ignore_ascii_case(s))
        {
            Self::All
        } else {
            Self::Containing(trimmed.to_string())
        }
    }

    /// Returns the pattern, or `None` when unfiltered.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Containing(p) => Some(p),
        }
    }

    /// Human-readable description for reports.
    #[must_use]
    pub fn label(&self) -> &str {
        self.pattern().unwrap_or("all")
    }
}
