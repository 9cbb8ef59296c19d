#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result and configuration types for crime rate analysis.
//!
//! Everything here is derived per query and discarded after rendering;
//! nothing is persisted.

use crime_rate_crime_models::{CrimeTypeFilter, SeverityTier};
use crime_rate_geography_models::{LocationId, LocationKind};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`AnalysisConfig::year`].
pub const YEAR_ENV: &str = "CRIME_RATE_YEAR";

/// Default analysis period.
pub const DEFAULT_YEAR: &str = "2024";

/// Communes below this population are left out of the commune ranking.
pub const DEFAULT_MIN_COMMUNE_POPULATION: u64 = 5_000;

/// Default length of the commune ranking.
pub const DEFAULT_COMMUNE_TOP_N: usize = 10;

/// Default length of the region ranking.
pub const DEFAULT_REGION_TOP_N: usize = 5;

/// Session-wide analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Year token matched against event dates. Fixed for the session.
    pub year: String,
    /// Minimum population for a commune to be ranked.
    pub min_commune_population: u64,
    /// Number of communes kept in the commune ranking.
    pub commune_top_n: usize,
    /// Number of regions kept in the region ranking.
    pub region_top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR.to_string(),
            min_commune_population: DEFAULT_MIN_COMMUNE_POPULATION,
            commune_top_n: DEFAULT_COMMUNE_TOP_N,
            region_top_n: DEFAULT_REGION_TOP_N,
        }
    }
}

impl AnalysisConfig {
    /// Defaults, with the year taken from `CRIME_RATE_YEAR` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(year) = std::env::var(YEAR_ENV) {
            let year = year.trim();
            if !year.is_empty() {
                config.year = year.to_string();
            }
        }
        config
    }

    /// Replaces the analysis year.
    #[must_use]
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }
}

/// A single-location query as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationQuery {
    /// Free-text place name.
    pub place: String,
    /// Which name field to search.
    pub kind: LocationKind,
    /// Crime type restriction.
    pub crime_type: CrimeTypeFilter,
}

/// Crime count, population and rate for one resolved query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Which name field was searched.
    pub kind: LocationKind,
    /// Matched location names.
    pub label: String,
    /// Number of identifiers the query resolved to.
    pub location_count: usize,
    /// Year token the counts were filtered by.
    pub year: String,
    /// Crime type restriction applied.
    pub crime_type: CrimeTypeFilter,
    /// Population summed over the resolved identifiers.
    pub population: u64,
    /// Crime count summed over matching events.
    pub crime_count: u64,
    /// Crimes per 100k population; 0 when population is 0.
    pub rate: f64,
    /// Tier of [`Self::rate`].
    pub severity: SeverityTier,
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// Commune or region name.
    pub label: String,
    /// Commune identifier; `None` for region rows.
    pub location_id: Option<LocationId>,
    /// Crimes per 100k population.
    pub rate: f64,
    /// Raw crime count.
    pub crime_count: u64,
    /// Population the rate was computed against.
    pub population: u64,
}

/// A descending top-N ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    /// Communes or regions.
    pub kind: LocationKind,
    /// Year token the counts were filtered by.
    pub year: String,
    /// Requested maximum length.
    pub top_n: usize,
    /// Minimum population applied, if any.
    pub min_population: Option<u64>,
    /// Number of candidates that passed filtering, before truncation.
    pub eligible: usize,
    /// Ranked rows, highest rate first.
    pub entries: Vec<RankingEntry>,
    /// Registry records read while building the ranking.
    pub summary: BatchSummary,
}

/// Why one source record was left out of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipReason {
    /// Key, row number or other locator of the record.
    pub record: String,
    /// What was wrong with it.
    pub reason: String,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.record, self.reason)
    }
}

/// Outcome of processing a batch of source records where bad records are
/// skipped instead of aborting the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Records seen, kept or not.
    pub processed: usize,
    /// Records left out, with the reason.
    pub skipped: Vec<SkipReason>,
}

impl BatchSummary {
    /// Records one outcome, returning the kept value.
    pub fn record<T, E: std::fmt::Display>(
        &mut self,
        locator: impl Into<String>,
        outcome: Result<T, E>,
    ) -> Option<T> {
        self.processed += 1;
        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                self.skipped.push(SkipReason {
                    record: locator.into(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Number of records kept.
    #[must_use]
    pub fn kept(&self) -> usize {
        self.processed - self.skipped.len()
    }

    /// Logs the summary, at `warn` level when anything was skipped.
    pub fn log(&self, what: &str) {
        if self.skipped.is_empty() {
            log::info!("{what}: {} record(s) processed", self.processed);
        } else {
            log::warn!(
                "{what}: {} record(s) processed, {} skipped",
                self.processed,
                self.skipped.len()
            );
            for skip in &self.skipped {
                log::debug!("Skipped {skip}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = BatchSummary::default();
        assert_eq!(summary.record("a", Ok::<_, String>(1)), Some(1));
        assert_eq!(summary.record("b", Err::<i32, _>("bad population")), None);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.kept(), 1);
        assert_eq!(summary.skipped[0].to_string(), "b: bad population");
    }

    #[test]
    fn config_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.year, "2024");
        assert_eq!(config.min_commune_population, 5_000);
        assert_eq!(config.commune_top_n, 10);
        assert_eq!(config.region_top_n, 5);
        assert_eq!(config.with_year("2023").year, "2023");
    }

    #[test]
    fn ranking_serializes_camel_case() {
        let entry = RankingEntry {
            label: "Iquique".to_string(),
            location_id: Some(LocationId(1101)),
            rate: 7.5,
            crime_count: 15,
            population: 200_000,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["locationId"], 1101);
        assert_eq!(json["crimeCount"], 15);
    }
}
