#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Text rendering of crime rate reports and rankings.
//!
//! Pure formatting: values are printed exactly as computed, with fixed
//! column widths and two-decimal rates.

use crime_rate_analytics_models::{AggregateResult, Ranking};
use crime_rate_geography_models::LocationKind;

const REPORT_WIDTH: usize = 50;
const RANKING_WIDTH: usize = 60;

/// Formats `n` with `,` between groups of three digits.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

const fn kind_title(kind: LocationKind) -> &'static str {
    match kind {
        LocationKind::Commune => "Commune",
        LocationKind::Region => "Region",
    }
}

/// Renders a single-location report.
#[must_use]
pub fn render_location_report(result: &AggregateResult) -> String {
    let heavy = "=".repeat(REPORT_WIDTH);
    let light = "-".repeat(REPORT_WIDTH);

    let lines = [
        heavy.clone(),
        format!("{} REPORT", kind_title(result.kind).to_uppercase()),
        heavy.clone(),
        format!("{:<20}{}", "Period:", result.year),
        format!("{:<20}{}", "Location:", result.label),
        format!("{:<20}{}", "Matched locations:", result.location_count),
        format!(
            "{:<20}{} inhabitants",
            "Population:",
            group_thousands(result.population)
        ),
        light.clone(),
        format!("{:<20}{}", "Crime type:", result.crime_type.label()),
        format!("{:<20}{}", "Total cases:", result.crime_count),
        light,
        format!("{:<20}{:.2}", "Rate per 100k:", result.rate),
        format!("{:<20}{}", "Severity:", result.severity),
        heavy,
    ];
    lines.join("\n")
}

const fn empty_ranking_note(kind: LocationKind) -> &'static str {
    match kind {
        LocationKind::Commune => "No eligible commune has crimes recorded for this period.",
        LocationKind::Region => "No region has a recorded population.",
    }
}

/// Renders a commune or region ranking table.
#[must_use]
pub fn render_ranking(ranking: &Ranking) -> String {
    let heavy = "=".repeat(RANKING_WIDTH);
    let light = "-".repeat(RANKING_WIDTH);
    let (plural, name_width) = match ranking.kind {
        LocationKind::Commune => ("COMMUNES", 20),
        LocationKind::Region => ("REGIONS", 25),
    };

    let mut lines = vec![
        heavy.clone(),
        format!(
            "TOP {} {plural} BY CRIME RATE ({})",
            ranking.top_n, ranking.year
        ),
        "(Normalized by population, annual rate)".to_string(),
        heavy,
        format!(
            "{:<3} {:<name_width$} {:<15} {:<10}",
            "#",
            kind_title(ranking.kind),
            "Rate x 100k",
            "Cases"
        ),
        light.clone(),
    ];

    if ranking.entries.is_empty() {
        lines.push(empty_ranking_note(ranking.kind).to_string());
    }
    for (i, entry) in ranking.entries.iter().enumerate() {
        lines.push(format!(
            "{:<3} {:<name_width$} {:<15.2} {:<10}",
            i + 1,
            entry.label,
            entry.rate,
            entry.crime_count
        ));
    }

    lines.push(light);
    if let Some(min) = ranking.min_population {
        lines.push(format!(
            "* {} with fewer than {} inhabitants are not included.",
            kind_title(ranking.kind).to_lowercase() + "s",
            group_thousands(min)
        ));
    }
    if !ranking.summary.skipped.is_empty() {
        lines.push(format!(
            "* {} malformed registry record(s) skipped, {} used.",
            ranking.summary.skipped.len(),
            ranking.summary.kept()
        ));
    }
    lines.join("\n")
}
