#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive terminal for crime rate queries.
//!
//! Opens the snapshot, checks both stores answer, then loops over a
//! `dialoguer` menu until the user exits. A place that matches nothing
//! only abandons that query; store failures end the session.
//!
//! Uses `indicatif-log-bridge` (via [`crime_rate_cli_utils::init_logger`])
//! so log lines and the registry spinner don't fight for the terminal.

mod menu;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crime_rate_analytics_models::AnalysisConfig;
use crime_rate_database::{db, paths};

#[derive(Parser)]
#[command(name = "crime_rate_cli", about = "Crime rates per 100k inhabitants")]
struct Cli {
    /// Snapshot path (defaults to `CRIME_RATE_DB` or `data/crime_rate.duckdb`)
    #[arg(long)]
    db: Option<PathBuf>,
    /// Year matched against event dates (defaults to `CRIME_RATE_YEAR` or 2024)
    #[arg(long)]
    year: Option<String>,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let multi = crime_rate_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = AnalysisConfig::from_env();
    if let Some(year) = cli.year {
        config = config.with_year(year);
    }
    let db_path = cli.db.unwrap_or_else(paths::db_path_from_env);

    let store = match db::connect(&db_path) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Cannot reach the data stores: {e}");
            eprintln!("Cannot reach the data stores at {}: {e}", db_path.display());
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("Crime Rate Analysis ({})", config.year);
    println!();

    menu::run(&store, &config, &multi)?;

    Ok(ExitCode::SUCCESS)
}
