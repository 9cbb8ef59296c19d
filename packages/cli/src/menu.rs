//! Main menu loop.

use crime_rate_analytics::{AnalyticsError, Analyzer};
use crime_rate_analytics_models::{AnalysisConfig, LocationQuery};
use crime_rate_cli_utils::{IndicatifProgress, MultiProgress, prompt_text};
use crime_rate_crime_models::CrimeTypeFilter;
use crime_rate_database::db::DuckDbStore;
use crime_rate_geography_models::LocationKind;
use dialoguer::Select;

/// Top-level menu entries.
#[derive(Clone, Copy)]
enum MenuAction {
    QueryCommune,
    QueryRegion,
    CommuneRanking,
    RegionRanking,
    Exit,
}

impl MenuAction {
    const ALL: &[Self] = &[
        Self::QueryCommune,
        Self::QueryRegion,
        Self::CommuneRanking,
        Self::RegionRanking,
        Self::Exit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::QueryCommune => "Query by commune",
            Self::QueryRegion => "Query by region",
            Self::CommuneRanking => "National commune ranking",
            Self::RegionRanking => "National region ranking",
            Self::Exit => "Exit",
        }
    }
}

/// Runs the menu until the user picks [`MenuAction::Exit`].
///
/// # Errors
///
/// Returns an error if a prompt fails or a store stops answering.
pub fn run(
    store: &DuckDbStore,
    config: &AnalysisConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = MenuAction::ALL.iter().map(MenuAction::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let analyzer = Analyzer::new(store, store, config.clone());
        let outcome = match MenuAction::ALL[idx] {
            MenuAction::QueryCommune => query_location(&analyzer, LocationKind::Commune)?,
            MenuAction::QueryRegion => query_location(&analyzer, LocationKind::Region)?,
            MenuAction::CommuneRanking => {
                let spinner = IndicatifProgress::registry_spinner(multi, "Reading registry");
                analyzer
                    .with_progress(spinner)
                    .commune_ranking()
                    .map(|r| crime_rate_report::render_ranking(&r))
            }
            MenuAction::RegionRanking => {
                let spinner = IndicatifProgress::registry_spinner(multi, "Reading registry");
                analyzer
                    .with_progress(spinner)
                    .region_ranking()
                    .map(|r| crime_rate_report::render_ranking(&r))
            }
            MenuAction::Exit => break,
        };

        match outcome {
            Ok(text) => println!("\n{text}\n"),
            Err(e) if e.is_recoverable() => {
                log::debug!("Query abandoned: {e}");
                println!("\n{e}\n");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn query_location(
    analyzer: &Analyzer<'_>,
    kind: LocationKind,
) -> Result<Result<String, AnalyticsError>, dialoguer::Error> {
    let prompt = match kind {
        LocationKind::Commune => "Commune name (e.g. Iquique)",
        LocationKind::Region => "Region name (e.g. Tarapacá)",
    };
    let place = prompt_text(prompt, None)?;
    let crime_type = prompt_text("Crime type ('all' for every type)", Some("all"))?;

    let query = LocationQuery {
        place,
        kind,
        crime_type: CrimeTypeFilter::parse(&crime_type),
    };
    Ok(analyzer
        .location_report(&query)
        .map(|r| crime_rate_report::render_location_report(&r)))
}
