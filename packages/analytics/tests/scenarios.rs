//! End-to-end checks of reports and rankings over in-memory stores.

use crime_rate_analytics::{Analyzer, AnalyticsError};
use crime_rate_analytics_models::{AnalysisConfig, LocationQuery};
use crime_rate_crime_models::{CrimeEvent, CrimeTypeFilter, SeverityTier};
use crime_rate_database::memory::{MemoryEventStore, MemoryRegistry};
use crime_rate_geography_models::{LocationId, LocationKind, LocationRecord};

fn record(id: i64, commune: &str, region: &str, population: u64) -> LocationRecord {
    LocationRecord {
        id: LocationId(id),
        commune: commune.to_string(),
        region: region.to_string(),
        population,
        population_year: Some(2025),
    }
}

fn event(date: &str, crime_type: &str, count: u64, location_id: i64) -> CrimeEvent {
    CrimeEvent {
        date: date.to_string(),
        crime_type: crime_type.to_string(),
        crime_count: count,
        location_id,
    }
}

fn query(place: &str, kind: LocationKind, crime_type: &str) -> LocationQuery {
    LocationQuery {
        place: place.to_string(),
        kind,
        crime_type: CrimeTypeFilter::parse(crime_type),
    }
}

fn iquique_snapshot() -> (MemoryRegistry, MemoryEventStore) {
    let mut registry = MemoryRegistry::new();
    registry
        .insert_record(&record(1101, "Iquique", "Tarapacá", 200_000))
        .unwrap();
    let events = MemoryEventStore::new(vec![
        event("2024-01-01", "Hurtos", 10, 1101),
        event("2024-02-01", "Robo con violencia", 5, 1101),
        event("2024-03-01", "Hurtos", 0, 1101),
        event("2023-03-01", "Hurtos", 70, 2101),
    ]);
    (registry, events)
}

#[test]
fn iquique_scenario() {
    let (registry, events) = iquique_snapshot();
    let analyzer = Analyzer::new(&registry, &events, AnalysisConfig::default());

    let report = analyzer
        .location_report(&query("iquique", LocationKind::Commune, "todos"))
        .unwrap();
    assert_eq!(report.crime_count, 15);
    assert_eq!(report.population, 200_000);
    assert!((report.rate - 7.5).abs() < 1e-9);
    assert_eq!(report.severity, SeverityTier::Low);
    assert_eq!(report.label, "Iquique");
}

#[test]
fn crime_type_filter_narrows_report() {
    let (registry, events) = iquique_snapshot();
    let analyzer = Analyzer::new(&registry, &events, AnalysisConfig::default());

    let report = analyzer
        .location_report(&query("Tarapaca", LocationKind::Region, "robo"))
        .unwrap();
    assert_eq!(report.crime_count, 5);
}

#[test]
fn valid_location_without_events_reports_zero() {
    let (registry, events) = iquique_snapshot();
    let analyzer = Analyzer::new(
        &registry,
        &events,
        AnalysisConfig::default().with_year("2019"),
    );

    let report = analyzer
        .location_report(&query("Iquique", LocationKind::Commune, "all"))
        .unwrap();
    assert_eq!(report.crime_count, 0);
    assert!(report.rate.abs() < f64::EPSILON);

    let ranking = analyzer.commune_ranking().unwrap();
    assert!(ranking.entries.is_empty());
}

#[test]
fn unknown_location_is_recoverable_not_found() {
    let (registry, events) = iquique_snapshot();
    let analyzer = Analyzer::new(&registry, &events, AnalysisConfig::default());

    let err = analyzer
        .location_report(&query("Springfield", LocationKind::Commune, "all"))
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::NotFound(_)));
    assert!(err.is_recoverable());
}

fn national_snapshot() -> (MemoryRegistry, MemoryEventStore) {
    let mut registry = MemoryRegistry::new();
    for r in [
        record(1101, "Iquique", "Región de Tarapacá", 200_000),
        record(1107, "Alto Hospicio", "Región de Tarapacá", 130_000),
        record(1402, "Camiña", "Región de Tarapacá", 1_200),
        record(8101, "Concepción", "Región del Biobío", 236_000),
        record(8102, "Coronel", "Región del Biobío", 131_000),
        record(13101, "Santiago", "Región Metropolitana", 503_000),
    ] {
        registry.insert_record(&r).unwrap();
    }
    registry.insert_raw("9999", r#"{"comuna": "Ghost", "region": "Nowhere"}"#);
    registry.insert_raw("n/a", r#"{"comuna": "Bad", "region": "Key", "poblacion": 10}"#);

    let events = MemoryEventStore::new(vec![
        event("2024-01", "Hurtos", 3_000, 1101),
        event("2024-01", "Hurtos", 1_000, 1107),
        event("2024-01", "Hurtos", 900, 1402),
        event("2024-05", "Hurtos", 2_000, 8101),
        event("2024-05", "Hurtos", 500, 8102),
        event("2024-06", "Hurtos", 12_000, 13101),
        event("2023-06", "Hurtos", 99_000, 13101),
        event("2024-06", "Hurtos", 5_000, 424_242),
    ]);
    (registry, events)
}

#[test]
fn commune_ranking_applies_population_floor() {
    let (registry, events) = national_snapshot();
    let analyzer = Analyzer::new(&registry, &events, AnalysisConfig::default());

    let ranking = analyzer.commune_ranking().unwrap();
    assert!(ranking.entries.len() <= 10);
    assert_eq!(ranking.eligible, ranking.entries.len());
    assert!(ranking.entries.iter().all(|e| e.label != "Camiña"));
    assert_eq!(ranking.entries[0].label, "Santiago");
    assert!(
        ranking
            .entries
            .windows(2)
            .all(|w| w[0].rate >= w[1].rate)
    );
    assert_eq!(ranking.summary.processed, 8);
    assert_eq!(ranking.summary.skipped.len(), 2);
}

#[test]
fn region_totals_equal_sum_of_commune_aggregates() {
    let (registry, events) = national_snapshot();
    let analyzer = Analyzer::new(&registry, &events, AnalysisConfig::default());

    let ranking = analyzer.region_ranking().unwrap();
    assert!(ranking.entries.len() <= 5);

    for entry in &ranking.entries {
        let region_report = analyzer
            .location_report(&query(&entry.label, LocationKind::Region, "all"))
            .unwrap();
        assert_eq!(region_report.crime_count, entry.crime_count);
        assert_eq!(region_report.population, entry.population);
    }

    let tarapaca = ranking
        .entries
        .iter()
        .find(|e| e.label == "Región de Tarapacá")
        .unwrap();
    assert_eq!(tarapaca.crime_count, 4_900);
    assert_eq!(tarapaca.population, 331_200);
}

#[test]
fn resolver_is_accent_and_spacing_insensitive() {
    let (registry, events) = national_snapshot();
    let analyzer = Analyzer::new(&registry, &events, AnalysisConfig::default());

    let spaced = analyzer
        .location_report(&query("bio bio", LocationKind::Region, "all"))
        .unwrap();
    let accented = analyzer
        .location_report(&query("Biobío", LocationKind::Region, "all"))
        .unwrap();
    assert_eq!(spaced.location_count, 2);
    assert_eq!(spaced.crime_count, accented.crime_count);
    assert_eq!(spaced.label, "Región del Biobío");
}

#[test]
fn rates_are_never_negative() {
    let (registry, events) = national_snapshot();
    let analyzer = Analyzer::new(&registry, &events, AnalysisConfig::default());
    for place in ["Iquique", "Alto Hospicio", "Camiña", "Concepción", "Coronel", "Santiago"] {
        let report = analyzer
            .location_report(&query(place, LocationKind::Commune, "all"))
            .unwrap();
        assert!(report.rate >= 0.0);
        assert_eq!(report.rate == 0.0, report.crime_count == 0 || report.population == 0);
    }
}
