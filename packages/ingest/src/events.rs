//! Crime-event CSV export (`,`-delimited, one row per commune, date and
//! crime type).

use std::collections::BTreeMap;
use std::io::Read;

use crime_rate_analytics::progress::ProgressCallback;
use crime_rate_analytics_models::BatchSummary;
use crime_rate_crime_models::CrimeEvent;
use serde::Deserialize;

use crate::{IngestError, parse_count, parse_id};

/// Commune and region names as they appear in the event export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    /// Commune name.
    pub commune: String,
    /// Region name.
    pub region: String,
}

/// Everything read from one event export.
#[derive(Debug, Default)]
pub struct ParsedEvents {
    /// One event per readable row, in file order.
    pub events: Vec<CrimeEvent>,
    /// Distinct communes seen, first occurrence wins.
    pub places: BTreeMap<i64, Place>,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    #[serde(alias = "date")]
    fecha: String,
    #[serde(alias = "crime_type")]
    delito: String,
    #[serde(alias = "crime_count")]
    delito_n: String,
    #[serde(alias = "location_id")]
    cut_comuna: String,
    #[serde(default, alias = "commune")]
    comuna: String,
    #[serde(default)]
    region: String,
}

impl EventRow {
    fn into_parts(self) -> Result<(CrimeEvent, Option<Place>), String> {
        let location_id = parse_id(&self.cut_comuna)
            .ok_or_else(|| format!("invalid commune id '{}'", self.cut_comuna))?;
        let crime_count = parse_count(&self.delito_n)
            .ok_or_else(|| format!("invalid crime count '{}'", self.delito_n))?;
        if self.delito.is_empty() {
            return Err("missing crime type".to_string());
        }

        let place = (!self.comuna.is_empty() && !self.region.is_empty()).then(|| Place {
            commune: self.comuna,
            region: self.region,
        });

        Ok((
            CrimeEvent {
                date: self.fecha,
                crime_type: self.delito,
                crime_count,
                location_id,
            },
            place,
        ))
    }
}

/// Rows between progress updates.
const PROGRESS_STRIDE: u64 = 10_000;

/// Reads every row of the event export.
///
/// Rows with an unreadable identifier, count or crime type are skipped and
/// recorded in `summary`. Rows without names still become events but do
/// not contribute a [`Place`].
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the header row cannot be read.
pub fn read_events(
    reader: impl Read,
    summary: &mut BatchSummary,
    progress: &dyn ProgressCallback,
) -> Result<ParsedEvents, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.headers().map_err(IngestError::csv("events"))?;

    let mut parsed = ParsedEvents::default();
    let mut pending: u64 = 0;
    for (i, result) in csv_reader.deserialize::<EventRow>().enumerate() {
        let locator = format!("event row {}", i + 2);
        let outcome = result
            .map_err(|e| e.to_string())
            .and_then(EventRow::into_parts);

        if let Some((event, place)) = summary.record(locator, outcome) {
            if let Some(place) = place {
                parsed.places.entry(event.location_id).or_insert(place);
            }
            parsed.events.push(event);
        }

        pending += 1;
        if pending == PROGRESS_STRIDE {
            progress.inc(pending);
            pending = 0;
        }
    }
    progress.inc(pending);

    log::debug!(
        "{} event(s) across {} commune(s)",
        parsed.events.len(),
        parsed.places.len()
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use crime_rate_analytics::progress::NullProgress;

    use super::*;

    const CSV: &str = "\
fecha,delito,delito_n,cut_comuna,comuna,region
2024-01-05,Robo con violencia,3,1101,Iquique,Tarapacá
2024-02-10,Hurto,2.0,1101,Iquique,Tarapacá
2023-12-31,Hurto,7,1107,Alto Hospicio,Tarapacá
2024-03-01,Hurto,x,1107,Alto Hospicio,Tarapacá
2024-03-02,Hurto,1,13101,,
";

    #[test]
    fn reads_events_and_places() {
        let mut summary = BatchSummary::default();
        let parsed = read_events(CSV.as_bytes(), &mut summary, &NullProgress).unwrap();

        assert_eq!(parsed.events.len(), 4);
        assert_eq!(parsed.events[1].crime_count, 2);
        assert_eq!(parsed.events[3].location_id, 13101);
        assert_eq!(parsed.places.len(), 2);
        assert_eq!(parsed.places[&1107].commune, "Alto Hospicio");
        assert_eq!(parsed.places[&1101].region, "Tarapacá");
    }

    #[test]
    fn non_numeric_count_is_skipped() {
        let mut summary = BatchSummary::default();
        read_events(CSV.as_bytes(), &mut summary, &NullProgress).unwrap();

        assert_eq!(summary.processed, 5);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].record, "event row 5");
    }
}
