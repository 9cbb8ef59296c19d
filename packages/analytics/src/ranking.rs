//! Commune and region rankings by crime rate.
//!
//! Both rankings join registry records against per-location crime totals
//! computed by a single grouped query, so building a ranking costs one
//! store round trip no matter how many locations exist. Events whose
//! location is not in the registry never reach a ranking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crime_rate_analytics_models::RankingEntry;
use crime_rate_geography_models::{LocationId, LocationRecord};

use crate::rate::rate_per_100k;

/// Entries that passed filtering, sorted, before truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntries {
    /// Number of candidates that passed filtering.
    pub eligible: usize,
    /// The first `top_n` candidates, highest rate first.
    pub entries: Vec<RankingEntry>,
}

/// Highest rate first; equal rates fall back to `tie`.
fn by_rate_desc(
    a: &RankingEntry,
    b: &RankingEntry,
    tie: impl Fn(&RankingEntry, &RankingEntry) -> Ordering,
) -> Ordering {
    b.rate.total_cmp(&a.rate).then_with(|| tie(a, b))
}

fn truncate(mut entries: Vec<RankingEntry>, top_n: usize) -> RankedEntries {
    let eligible = entries.len();
    entries.truncate(top_n);
    RankedEntries { eligible, entries }
}

/// Ranks individual communes.
///
/// Communes with population below `min_population` or without any
/// matching crime are left out. Equal rates are ordered by identifier.
#[must_use]
pub fn rank_communes(
    records: &[LocationRecord],
    totals: &BTreeMap<LocationId, u64>,
    min_population: u64,
    top_n: usize,
) -> RankedEntries {
    let mut entries: Vec<RankingEntry> = records
        .iter()
        .filter(|record| record.population >= min_population)
        .filter_map(|record| {
            let crime_count = totals.get(&record.id).copied().unwrap_or(0);
            (crime_count > 0).then(|| RankingEntry {
                label: record.commune.clone(),
                location_id: Some(record.id),
                rate: rate_per_100k(crime_count, record.population),
                crime_count,
                population: record.population,
            })
        })
        .collect();

    entries.sort_by(|a, b| by_rate_desc(a, b, |a, b| a.location_id.cmp(&b.location_id)));
    truncate(entries, top_n)
}

/// Ranks regions, each the sum of all its communes.
///
/// No population floor applies. Regions whose summed population is zero
/// cannot be rated and are left out; regions without crime are kept with
/// rate 0. Equal rates are ordered by region name.
#[must_use]
pub fn rank_regions(
    records: &[LocationRecord],
    totals: &BTreeMap<LocationId, u64>,
    top_n: usize,
) -> RankedEntries {
    let mut regions: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for record in records {
        let (population, crimes) = regions.entry(record.region.as_str()).or_default();
        *population = population.saturating_add(record.population);
        *crimes = crimes.saturating_add(totals.get(&record.id).copied().unwrap_or(0));
    }

    let mut entries: Vec<RankingEntry> = regions
        .into_iter()
        .filter(|(_, (population, _))| *population > 0)
        .map(|(region, (population, crime_count))| RankingEntry {
            label: region.to_string(),
            location_id: None,
            rate: rate_per_100k(crime_count, population),
            crime_count,
            population,
        })
        .collect();

    entries.sort_by(|a, b| by_rate_desc(a, b, |a, b| a.label.cmp(&b.label)));
    truncate(entries, top_n)
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
            population_year: None,
        }
    }

    #[test]
    fn small_communes_are_excluded_even_if_worst() {
        let records = vec![
            record(1, "Tiny", "North", 4_999),
            record(2, "Big", "North", 100_000),
        ];
        let totals = BTreeMap::from([(LocationId(1), 4_000), (LocationId(2), 100)]);
        let ranked = rank_communes(&records, &totals, 5_000, 10);
        assert_eq!(ranked.eligible, 1);
        assert_eq!(ranked.entries[0].label, "Big");
    }

    #[test]
    fn zero_crime_communes_are_excluded() {
        let records = vec![record(1, "Quiet", "North", 50_000)];
        let ranked = rank_communes(&records, &BTreeMap::new(), 5_000, 10);
        assert!(ranked.entries.is_empty());
        assert_eq!(ranked.eligible, 0);
    }

    #[test]
    fn communes_sorted_desc_and_truncated() {
        let records: Vec<LocationRecord> = (1..=12)
            .map(|i| record(i, &format!("C{i}"), "North", 10_000))
            .collect();
        let totals: BTreeMap<LocationId, u64> = (1..=12)
            .map(|i| (LocationId(i), u64::try_from(i).unwrap() * 10))
            .collect();
        let ranked = rank_communes(&records, &totals, 5_000, 10);
        assert_eq!(ranked.eligible, 12);
        assert_eq!(ranked.entries.len(), 10);
        assert_eq!(ranked.entries[0].label, "C12");
        assert!(
            ranked
                .entries
                .windows(2)
                .all(|w| w[0].rate >= w[1].rate)
        );
    }

    #[test]
    fn equal_rates_break_by_identifier() {
        let records = vec![
            record(30, "C", "North", 10_000),
            record(10, "A", "North", 10_000),
            record(20, "B", "North", 10_000),
        ];
        let totals = BTreeMap::from([
            (LocationId(10), 5),
            (LocationId(20), 5),
            (LocationId(30), 5),
        ]);
        let ranked = rank_communes(&records, &totals, 5_000, 10);
        let labels: Vec<&str> = ranked.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn region_totals_sum_their_communes() {
        let records = vec![
            record(1, "A", "North", 1_000),
            record(2, "B", "North", 3_000),
            record(3, "C", "South", 10_000),
        ];
        let totals = BTreeMap::from([
            (LocationId(1), 10),
            (LocationId(2), 30),
            (LocationId(3), 50),
            (LocationId(99), 1_000),
        ]);
        let ranked = rank_regions(&records, &totals, 5);
        assert_eq!(ranked.entries.len(), 2);

        let north = &ranked.entries[0];
        assert_eq!(north.label, "North");
        assert_eq!(north.crime_count, 40);
        assert_eq!(north.population, 4_000);
        assert!((north.rate - 1_000.0).abs() < 1e-9);

        let south = &ranked.entries[1];
        assert_eq!(south.crime_count, 50);
        assert!((south.rate - 500.0).abs() < 1e-9);
    }

    #[test]
    fn regions_have_no_population_floor() {
        let records = vec![record(1, "A", "Islands", 800), record(2, "B", "Empty", 0)];
        let totals = BTreeMap::from([(LocationId(1), 8)]);
        let ranked = rank_regions(&records, &totals, 5);
        assert_eq!(ranked.entries.len(), 1);
        assert_eq!(ranked.entries[0].label, "Islands");
    }

    #[test]
    fn regions_truncate_to_top_n() {
        let records: Vec<LocationRecord> = (1..=8)
            .map(|i| record(i, "X", &format!("R{i}"), 1_000))
            .collect();
        let ranked = rank_regions(&records, &BTreeMap::new(), 5);
        assert_eq!(ranked.eligible, 8);
        assert_eq!(ranked.entries.len(), 5);
        assert_eq!(ranked.entries[0].label, "R1");
    }
}
