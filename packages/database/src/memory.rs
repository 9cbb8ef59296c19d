//! In-process stores.
//!
//! Hold a whole snapshot in memory. Used by tests and for snapshots small
//! enough that a `DuckDB` file is not worth it.

use std::collections::BTreeMap;

use crime_rate_crime_models::CrimeEvent;
use crime_rate_database_models::EventFilter;
use crime_rate_geography_models::{LocationId, LocationRecord};

use crate::{CrimeEventStore, DbError, PopulationRegistry, fold_crime_type};

/// Population registry held in a sorted map of raw key/value pairs.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    entries: BTreeMap<String, String>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value under `key`, valid or not.
    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Stores `record` under its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conversion`] if the record cannot be serialized.
    pub fn insert_record(&mut self, record: &LocationRecord) -> Result<(), DbError> {
        let value = record.encode_value().map_err(|e| DbError::Conversion {
            message: e.to_string(),
        })?;
        self.insert_raw(record.id.to_string(), value);
        Ok(())
    }
}

impl PopulationRegistry for MemoryRegistry {
    fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, DbError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        Ok(self.entries.get(key).cloned())
    }
}

/// Crime-event store held in a vector, scanned on every query.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Vec<CrimeEvent>,
}

impl MemoryEventStore {
    /// Creates a store holding `events`.
    #[must_use]
    pub const fn new(events: Vec<CrimeEvent>) -> Self {
        Self { events }
    }

    /// Appends one event.
    pub fn push(&mut self, event: CrimeEvent) {
        self.events.push(event);
    }

    fn matching<'a>(&'a self, filter: &'a EventFilter) -> impl Iterator<Item = &'a CrimeEvent> {
        let pattern = filter.crime_type.pattern().map(fold_crime_type);
        self.events.iter().filter(move |event| {
            filter.admits_location_and_year(event)
                && pattern
                    .as_ref()
                    .is_none_or(|p| fold_crime_type(&event.crime_type).contains(p.as_str()))
        })
    }
}

impl CrimeEventStore for MemoryEventStore {
    fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    fn sum_counts(&self, filter: &EventFilter) -> Result<u64, DbError> {
        Ok(self
            .matching(filter)
            .fold(0u64, |acc, event| acc.saturating_add(event.crime_count)))
    }

    fn sum_counts_by_location(
        &self,
        filter: &EventFilter,
    ) -> Result<BTreeMap<LocationId, u64>, DbError> {
        let mut totals: BTreeMap<LocationId, u64> = BTreeMap::new();
        for event in self.matching(filter) {
            let total = totals.entry(LocationId(event.location_id)).or_insert(0);
            *total = total.saturating_add(event.crime_count);
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crime_rate_crime_models::CrimeTypeFilter;

    use super::*;

    fn store() -> MemoryEventStore {
        let mut store = MemoryEventStore::default();
        for (date, crime_type, count, id) in [
            ("2024-01", "Robo con violencia", 10, 1101),
            ("2024-02", "Hurtos", 5, 1101),
            ("2024-03", "Hurtos", 0, 1101),
            ("2022-02", "Hurtos", 40, 1101),
            ("2024-07", "Hurtos", 3, 2101),
        ] {
            store.push(CrimeEvent {
                date: date.to_string(),
                crime_type: crime_type.to_string(),
                crime_count: count,
                location_id: id,
            });
        }
        store
    }

    #[test]
    fn sums_restricted_locations() {
        let filter =
            EventFilter::for_year("2024").with_locations(BTreeSet::from([LocationId(1101)]));
        assert_eq!(store().sum_counts(&filter).unwrap(), 15);
    }

    #[test]
    fn filters_by_crime_type_substring() {
        let filter = EventFilter::for_year("2024").with_crime_type(CrimeTypeFilter::parse("hurto"));
        assert_eq!(store().sum_counts(&filter).unwrap(), 8);
    }

    #[test]
    fn groups_by_location() {
        let totals = store()
            .sum_counts_by_location(&EventFilter::for_year("2024"))
            .unwrap();
        assert_eq!(
            totals,
            BTreeMap::from([(LocationId(1101), 15), (LocationId(2101), 3)])
        );
    }

    #[test]
    fn registry_keeps_malformed_values() {
        let mut registry = MemoryRegistry::new();
        registry.insert_raw("x", "not json");
        registry
            .insert_record(&LocationRecord {
                id: LocationId(1101),
                commune: "Iquique".to_string(),
                region: "Tarapacá".to_string(),
                population: 200_000,
                population_year: None,
            })
            .unwrap();
        assert_eq!(registry.keys().unwrap(), vec!["1101", "x"]);
        assert_eq!(registry.get("x").unwrap().as_deref(), Some("not json"));
    }
}
