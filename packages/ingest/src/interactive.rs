//! Prompt-driven load for operators who don't remember the flags.

use std::path::PathBuf;

use crime_rate_cli_utils::{IndicatifProgress, MultiProgress, prompt_text};
use crime_rate_database::{db::DuckDbStore, paths};
use dialoguer::Confirm;

use crate::{DEFAULT_POPULATION_YEAR, LoadOptions};

/// Prompts for the input files, reference year and snapshot path, then
/// runs [`crate::load`].
///
/// # Errors
///
/// Returns an error if a prompt fails, the year is not an integer, or the
/// load fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let population_path = prompt_text("Population CSV (';'-separated)", Some("poblacion.csv"))?;
    let events_path = prompt_text("Crime event CSV", Some("output.csv"))?;
    let year: i32 = prompt_text(
        "Population reference year",
        Some(&DEFAULT_POPULATION_YEAR.to_string()),
    )?
    .parse()?;
    let db_path = prompt_text(
        "Snapshot path",
        Some(&paths::db_path_from_env().display().to_string()),
    )?;

    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Replace all registry entries and events in {db_path}?"
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("Nothing loaded.");
        return Ok(());
    }

    let store = DuckDbStore::open(&PathBuf::from(db_path))?;
    let options = LoadOptions {
        population_path: PathBuf::from(population_path),
        events_path: PathBuf::from(events_path),
        population_year: year,
    };
    let progress = IndicatifProgress::records_bar(multi, "Loading");
    let report = crate::load(&store, &options, Some(progress))?;

    println!("{report}");
    Ok(())
}
