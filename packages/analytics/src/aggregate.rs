//! Crime count aggregation over the event store.

use std::collections::{BTreeMap, BTreeSet};

use crime_rate_crime_models::CrimeTypeFilter;
use crime_rate_database::CrimeEventStore;
use crime_rate_database_models::EventFilter;
use crime_rate_geography_models::LocationId;

use crate::AnalyticsError;

/// Sums crime counts for a year, optionally restricted by crime type.
pub struct CrimeAggregator<'a> {
    store: &'a dyn CrimeEventStore,
    year: &'a str,
}

impl<'a> CrimeAggregator<'a> {
    /// Creates an aggregator over `store` for events dated in `year`.
    #[must_use]
    pub const fn new(store: &'a dyn CrimeEventStore, year: &'a str) -> Self {
        Self { store, year }
    }

    /// Total crime count over `ids`. Returns 0 when no event matches.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::EmptyLocationSet`] if `ids` is empty, or
    /// [`AnalyticsError::Store`] if the query fails.
    pub fn total(
        &self,
        ids: &BTreeSet<LocationId>,
        crime_type: &CrimeTypeFilter,
    ) -> Result<u64, AnalyticsError> {
        if ids.is_empty() {
            return Err(AnalyticsError::EmptyLocationSet);
        }
        let filter = EventFilter::for_year(self.year)
            .with_locations(ids.clone())
            .with_crime_type(crime_type.clone());
        Ok(self.store.sum_counts(&filter)?)
    }

    /// Crime count per location, for every location, in one grouped
    /// query. Locations without matching events are absent.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Store`] if the query fails.
    pub fn totals_by_location(
        &self,
        crime_type: &CrimeTypeFilter,
    ) -> Result<BTreeMap<LocationId, u64>, AnalyticsError> {
        let filter = EventFilter::for_year(self.year).with_crime_type(crime_type.clone());
        let totals = self.store.sum_counts_by_location(&filter)?;
        log::debug!(
            "Grouped crime totals for {}: {} location(s)",
            self.year,
            totals.len()
        );
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use crime_rate_crime_models::CrimeEvent;
    use crime_rate_database::memory::MemoryEventStore;

    use super::*;

    fn event(date: &str, count: u64, location_id: i64) -> CrimeEvent {
        CrimeEvent {
            date: date.to_string(),
            crime_type: "Hurtos".to_string(),
            crime_count: count,
            location_id,
        }
    }

    #[test]
    fn sums_matching_events() {
        let store = MemoryEventStore::new(vec![
            event("2024-01", 10, 1101),
            event("2024-02", 5, 1101),
            event("2024-03", 0, 1101),
            event("2023-01", 8, 2101),
        ]);
        let aggregator = CrimeAggregator::new(&store, "2024");
        let total = aggregator
            .total(&BTreeSet::from([LocationId(1101)]), &CrimeTypeFilter::All)
            .unwrap();
        assert_eq!(total, 15);
    }

    #[test]
    fn no_matching_events_is_zero() {
        let store = MemoryEventStore::new(vec![event("2023-01", 8, 1101)]);
        let aggregator = CrimeAggregator::new(&store, "2024");
        let total = aggregator
            .total(&BTreeSet::from([LocationId(1101)]), &CrimeTypeFilter::All)
            .unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn rejects_empty_location_set() {
        let store = MemoryEventStore::default();
        let aggregator = CrimeAggregator::new(&store, "2024");
        assert!(matches!(
            aggregator.total(&BTreeSet::new(), &CrimeTypeFilter::All),
            Err(AnalyticsError::EmptyLocationSet)
        ));
    }

    #[test]
    fn grouped_totals_include_orphans() {
        let store = MemoryEventStore::new(vec![event("2024-01", 3, 1101), event("2024-01", 4, 9999)]);
        let totals = CrimeAggregator::new(&store, "2024")
            .totals_by_location(&CrimeTypeFilter::All)
            .unwrap();
        assert_eq!(totals.get(&LocationId(9999)), Some(&4));
    }
}
