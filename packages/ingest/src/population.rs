//! Population projection CSV (`;`-delimited, one row per commune and year).

use std::collections::BTreeMap;
use std::io::Read;

use crime_rate_analytics_models::BatchSummary;
use serde::Deserialize;

use crate::{IngestError, parse_count, parse_id};

/// Delimiter of the population export.
pub const POPULATION_DELIMITER: u8 = b';';

#[derive(Debug, Deserialize)]
struct PopulationRow {
    #[serde(rename = "año", alias = "anio", alias = "year")]
    year: String,
    #[serde(alias = "location_id")]
    cut_comuna: String,
    #[serde(rename = "población", alias = "poblacion", alias = "population")]
    population: String,
}

/// Reads the rows for `year` into an identifier to population map.
///
/// Rows for other years are ignored without being counted. Rows for
/// `year` with an unreadable identifier or population are skipped and
/// recorded in `summary`. A later row for the same identifier wins.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the header row cannot be read.
pub fn read_population(
    reader: impl Read,
    year: i32,
    summary: &mut BatchSummary,
) -> Result<BTreeMap<i64, u64>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(POPULATION_DELIMITER)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.headers().map_err(IngestError::csv("population"))?;

    let mut populations = BTreeMap::new();
    for (i, result) in csv_reader.deserialize::<PopulationRow>().enumerate() {
        let locator = format!("population row {}", i + 2);
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                summary.record(locator, Err::<(), _>(e));
                continue;
            }
        };

        if parse_id(&row.year) != Some(i64::from(year)) {
            continue;
        }

        let parsed = parse_id(&row.cut_comuna)
            .ok_or_else(|| format!("invalid commune id '{}'", row.cut_comuna))
            .and_then(|id| {
                parse_count(&row.population)
                    .map(|p| (id, p))
                    .ok_or_else(|| format!("invalid population '{}'", row.population))
            });
        if let Some((id, population)) = summary.record(locator, parsed) {
            populations.insert(id, population);
        }
    }

    log::debug!("{} population figure(s) for {year}", populations.len());
    Ok(populations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
año;cut_comuna;población
2024;1101;190000
2025;1101;200000
2025;1107;110000
2025;abc;500
2025;5101;n/a
";

    #[test]
    fn keeps_only_requested_year() {
        let mut summary = BatchSummary::default();
        let map = read_population(CSV.as_bytes(), 2025, &mut summary).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1101], 200_000);
        assert_eq!(map[&1107], 110_000);
    }

    #[test]
    fn bad_rows_for_the_year_are_skipped() {
        let mut summary = BatchSummary::default();
        read_population(CSV.as_bytes(), 2025, &mut summary).unwrap();
        assert_eq!(summary.processed, 4);
        assert_eq!(summary.skipped.len(), 2);
        assert!(summary.skipped[0].reason.contains("abc"));
        assert!(summary.skipped[1].reason.contains("n/a"));
    }

    #[test]
    fn unknown_year_yields_empty_map() {
        let mut summary = BatchSummary::default();
        let map = read_population(CSV.as_bytes(), 1990, &mut summary).unwrap();
        assert!(map.is_empty());
        assert_eq!(summary.processed, 0);
    }
}
