//! Resolves free-text place names to registry identifiers.

use std::collections::BTreeSet;

use crime_rate_geography_models::{LocationId, LocationKind, LocationRecord};

use crate::ResolveError;
use crate::normalize::match_key;

/// The identifiers a query resolved to, with their combined population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Which name field was searched.
    pub kind: LocationKind,
    /// Distinct matched names in registry order, joined by `", "`.
    pub label: String,
    /// Matched identifiers. Never empty.
    pub ids: BTreeSet<LocationId>,
    /// Sum of the population of every matched record.
    pub population: u64,
}

/// Finds every record whose `kind` name contains `query`, ignoring case,
/// accents, whitespace and punctuation.
///
/// Matching is by substring, so `"metropol"` resolves to every commune of
/// `"Región Metropolitana"`. Population is summed in the same pass.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] if the query is blank or nothing
/// matches.
pub fn resolve<'a>(
    query: &str,
    kind: LocationKind,
    records: impl IntoIterator<Item = &'a LocationRecord>,
) -> Result<Resolution, ResolveError> {
    let not_found = || ResolveError::NotFound {
        query: query.trim().to_string(),
        kind,
    };

    let needle = match_key(query);
    if needle.is_empty() {
        return Err(not_found());
    }

    let mut ids = BTreeSet::new();
    let mut names: Vec<&str> = Vec::new();
    let mut population = 0u64;

    for record in records {
        let name = record.name(kind);
        if !match_key(name).contains(&needle) {
            continue;
        }
        if ids.insert(record.id) {
            population = population.saturating_add(record.population);
        }
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if ids.is_empty() {
        return Err(not_found());
    }

    log::debug!(
        "Resolved {kind} '{query}' to {} location(s), population {population}",
        ids.len()
    );

    Ok(Resolution {
        kind,
        label: names.join(", "),
        ids,
        population,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, commune: &str, region: &str, population: u64) -> LocationRecord {
        LocationRecord {
            id: LocationId(id),
            commune: commune.to_string(),
            region: region.to_string(),
            population,
            population_year: Some(2025),
        }
    }

    fn registry() -> Vec<LocationRecord> {
        vec![
            record(13101, "Santiago", "Región Metropolitana", 503_147),
            record(13120, "Ñuñoa", "Región Metropolitana", 250_192),
            record(8101, "Concepción", "Región del Biobío", 236_413),
            record(8102, "Coronel", "Región del Biobío", 131_063),
            record(1101, "Iquique", "Región de Tarapacá", 200_000),
        ]
    }

    #[test]
    fn substring_matches_region() {
        let records = registry();
        let resolution = resolve("metropol", LocationKind::Region, &records).unwrap();
        assert_eq!(
            resolution.ids,
            BTreeSet::from([LocationId(13101), LocationId(13120)])
        );
        assert_eq!(resolution.population, 503_147 + 250_192);
        assert_eq!(resolution.label, "Región Metropolitana");
    }

    #[test]
    fn accent_and_spacing_insensitive() {
        let records = registry();
        let spaced = resolve("bio bio", LocationKind::Region, &records).unwrap();
        let accented = resolve("Biobío", LocationKind::Region, &records).unwrap();
        assert_eq!(spaced.ids, accented.ids);
        assert_eq!(spaced.ids.len(), 2);

        let nunoa = resolve("NUNOA", LocationKind::Commune, &records).unwrap();
        assert_eq!(nunoa.ids, BTreeSet::from([LocationId(13120)]));
        assert_eq!(nunoa.label, "Ñuñoa");
    }

    #[test]
    fn label_joins_distinct_names() {
        let records = registry();
        let resolution = resolve("co", LocationKind::Commune, &records).unwrap();
        assert_eq!(resolution.label, "Concepción, Coronel");
    }

    #[test]
    fn no_match_is_not_found() {
        let records = registry();
        let err = resolve("Atlantis", LocationKind::Commune, &records).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                query: "Atlantis".to_string(),
                kind: LocationKind::Commune,
            }
        );
    }

    #[test]
    fn blank_query_is_not_found() {
        let records = registry();
        assert!(resolve("   ", LocationKind::Region, &records).is_err());
    }

    #[test]
    fn duplicate_records_counted_once() {
        let mut records = registry();
        records.push(record(1101, "Iquique", "Región de Tarapacá", 200_000));
        let resolution = resolve("iquique", LocationKind::Commune, &records).unwrap();
        assert_eq!(resolution.population, 200_000);
    }
}
