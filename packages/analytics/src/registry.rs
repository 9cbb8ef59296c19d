//! Reads the population registry into typed records.

use crime_rate_analytics_models::BatchSummary;
use crime_rate_database::PopulationRegistry;
use crime_rate_geography_models::{LocationRecord, MalformedRecord};

use crate::AnalyticsError;
use crate::progress::ProgressCallback;

/// Every decodable registry record, plus what was skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedLocations {
    /// Decoded records, in key order.
    pub records: Vec<LocationRecord>,
    /// Per-record outcome counts and skip reasons.
    pub summary: BatchSummary,
}

/// Enumerates and decodes every registry entry.
///
/// Malformed entries and keys whose value disappeared between
/// enumeration and lookup are recorded in the summary and skipped.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the registry cannot be read.
pub fn load_locations(
    registry: &dyn PopulationRegistry,
    progress: &dyn ProgressCallback,
) -> Result<LoadedLocations, AnalyticsError> {
    let keys = registry.keys()?;
    progress.set_total(keys.len() as u64);

    let mut loaded = LoadedLocations::default();
    for key in keys {
        let outcome = registry.get(&key)?.map_or_else(
            || {
                Err(MalformedRecord::InvalidValue {
                    message: "value vanished".to_string(),
                })
            },
            |value| LocationRecord::decode(&key, &value),
        );
        if let Some(record) = loaded.summary.record(key, outcome) {
            loaded.records.push(record);
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    loaded.summary.log("Population registry");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use crime_rate_database::memory::MemoryRegistry;
    use crime_rate_geography_models::LocationId;

    use super::*;
    use crate::progress::NullProgress;

    #[test]
    fn skips_malformed_entries() {
        let mut registry = MemoryRegistry::new();
        registry.insert_raw(
            "1101",
            r#"{"comuna":"Iquique","region":"Tarapacá","poblacion":200000}"#,
        );
        registry.insert_raw("1107", r#"{"comuna":"Alto Hospicio","region":"Tarapacá"}"#);
        registry.insert_raw("x", r#"{"comuna":"X","region":"Y","poblacion":1}"#);

        let loaded = load_locations(&registry, &NullProgress).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].id, LocationId(1101));
        assert_eq!(loaded.summary.processed, 3);
        assert_eq!(loaded.summary.skipped.len(), 2);
        assert_eq!(loaded.summary.skipped[0].record, "1107");
        assert_eq!(loaded.summary.skipped[1].record, "x");
    }
}
