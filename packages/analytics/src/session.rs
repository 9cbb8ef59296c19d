//! Query session over the two stores.
//!
//! An [`Analyzer`] borrows both store handles for the lifetime of a
//! session and answers one query at a time. Nothing is cached: every call
//! re-reads the registry and re-aggregates the events.

use std::sync::Arc;

use crime_rate_analytics_models::{AggregateResult, AnalysisConfig, LocationQuery, Ranking};
use crime_rate_crime_models::CrimeTypeFilter;
use crime_rate_database::{CrimeEventStore, PopulationRegistry};
use crime_rate_geography::resolver::resolve;
use crime_rate_geography_models::LocationKind;

use crate::AnalyticsError;
use crate::aggregate::CrimeAggregator;
use crate::progress::{ProgressCallback, null_progress};
use crate::ranking::{rank_communes, rank_regions};
use crate::rate::classify;
use crate::registry::load_locations;

/// Answers location reports and rankings against injected stores.
///
/// Cheap to build; callers typically create one per query so that each
/// gets a fresh progress indicator.
pub struct Analyzer<'a> {
    registry: &'a dyn PopulationRegistry,
    events: &'a dyn CrimeEventStore,
    config: AnalysisConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl<'a> Analyzer<'a> {
    /// Creates a session over `registry` and `events`.
    #[must_use]
    pub fn new(
        registry: &'a dyn PopulationRegistry,
        events: &'a dyn CrimeEventStore,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            registry,
            events,
            config,
            progress: null_progress(),
        }
    }

    /// Reports registry enumeration progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Crime count, population and rate for one place name.
    ///
    /// A valid location without matching events reports a count and rate
    /// of 0.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NotFound`] if the name matches no
    /// location (no aggregation is attempted), or
    /// [`AnalyticsError::Store`] if a store fails.
    pub fn location_report(&self, query: &LocationQuery) -> Result<AggregateResult, AnalyticsError> {
        log::info!(
            "Querying {} '{}' for {} (crime type: {})",
            query.kind,
            query.place,
            self.config.year,
            query.crime_type.label()
        );

        let loaded = load_locations(self.registry, self.progress.as_ref())?;
        let resolution = resolve(&query.place, query.kind, &loaded.records)?;

        let crime_count = CrimeAggregator::new(self.events, &self.config.year)
            .total(&resolution.ids, &query.crime_type)?;
        let (rate, severity) = classify(crime_count, resolution.population);

        Ok(AggregateResult {
            kind: query.kind,
            label: resolution.label,
            location_count: resolution.ids.len(),
            year: self.config.year.clone(),
            crime_type: query.crime_type.clone(),
            population: resolution.population,
            crime_count,
            rate,
            severity,
        })
    }

    /// National commune ranking: top communes by rate, skipping communes
    /// under the population floor and communes without crime.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if a store fails.
    pub fn commune_ranking(&self) -> Result<Ranking, AnalyticsError> {
        log::info!("Building commune ranking for {}", self.config.year);

        let loaded = load_locations(self.registry, self.progress.as_ref())?;
        let totals = CrimeAggregator::new(self.events, &self.config.year)
            .totals_by_location(&CrimeTypeFilter::All)?;
        let ranked = rank_communes(
            &loaded.records,
            &totals,
            self.config.min_commune_population,
            self.config.commune_top_n,
        );

        Ok(Ranking {
            kind: LocationKind::Commune,
            year: self.config.year.clone(),
            top_n: self.config.commune_top_n,
            min_population: Some(self.config.min_commune_population),
            eligible: ranked.eligible,
            entries: ranked.entries,
            summary: loaded.summary,
        })
    }

    /// National region ranking: top regions by rate, each region summing
    /// every one of its communes.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if a store fails.
    pub fn region_ranking(&self) -> Result<Ranking, AnalyticsError> {
        log::info!("Building region ranking for {}", self.config.year);

        let loaded = load_locations(self.registry, self.progress.as_ref())?;
        let totals = CrimeAggregator::new(self.events, &self.config.year)
            .totals_by_location(&CrimeTypeFilter::All)?;
        let ranked = rank_regions(&loaded.records, &totals, self.config.region_top_n);

        Ok(Ranking {
            kind: LocationKind::Region,
            year: self.config.year.clone(),
            top_n: self.config.region_top_n,
            min_population: None,
            eligible: ranked.eligible,
            entries: ranked.entries,
            summary: loaded.summary,
        })
    }
}
