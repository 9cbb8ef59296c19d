#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the crime rate snapshot loader.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crime_rate_cli_utils::IndicatifProgress;
use crime_rate_database::{db::DuckDbStore, paths};
use crime_rate_ingest::{DEFAULT_POPULATION_YEAR, LoadOptions};

#[derive(Parser)]
#[command(name = "crime_rate_ingest", about = "Crime rate snapshot loader")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the snapshot with the given population and event exports
    Load {
        /// Population projection CSV (`;`-separated: año, `cut_comuna`, población)
        #[arg(long)]
        population: PathBuf,
        /// Crime event CSV (fecha, delito, `delito_n`, `cut_comuna`, comuna, region)
        #[arg(long)]
        events: PathBuf,
        /// Year of the population figures to keep
        #[arg(long, default_value_t = DEFAULT_POPULATION_YEAR)]
        population_year: i32,
        /// Snapshot path (defaults to `CRIME_RATE_DB` or `data/crime_rate.duckdb`)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_rate_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return crime_rate_ingest::interactive::run(&multi);
    };

    match command {
        Commands::Load {
            population,
            events,
            population_year,
            db,
        } => {
            let db_path = db.unwrap_or_else(paths::db_path_from_env);
            log::info!("Writing snapshot {}", db_path.display());
            let store = DuckDbStore::open(&db_path)?;

            let options = LoadOptions {
                population_path: population,
                events_path: events,
                population_year,
            };
            let progress = IndicatifProgress::records_bar(&multi, "Loading");
            let report = crime_rate_ingest::load(&store, &options, Some(progress))?;

            println!("{report}");
        }
    }

    Ok(())
}
