#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the crime rate tools.
//!
//! Provides `indicatif` progress indicators behind the analytics
//! [`ProgressCallback`] trait, [`init_logger`] which routes `log` output
//! through `indicatif-log-bridge` so lines don't tear spinners, and a
//! couple of `dialoguer` prompt helpers.

use std::sync::Arc;
use std::time::Duration;

use crime_rate_analytics::progress::ProgressCallback;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style applied once `set_total()` provides a known length.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    fn spinner_with(
        multi: &MultiProgress,
        message: &str,
        spinner_template: &str,
        bar_template: &str,
    ) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template(spinner_template)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(bar_template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");

        Arc::new(Self { bar, bar_style })
    }

    /// Spinner shown while registry entries are read for a query. Turns
    /// into a bar once the number of entries is known.
    #[must_use]
    pub fn registry_spinner(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        Self::spinner_with(
            multi,
            message,
            "{spinner:.cyan} {msg}",
            "  {msg} {wide_bar:.cyan/dim} {pos}/{len}",
        )
    }

    /// Counter for bulk loads where rows stream in without a known total.
    #[must_use]
    pub fn records_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        Self::spinner_with(
            multi,
            message,
            "{spinner:.yellow} {msg} {pos} rows [{elapsed}]",
            "  {msg} {wide_bar:.yellow/dim} {pos}/{len} {percent}% [{eta}]",
        )
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Already set when several binaries share a test process.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

/// Prompts for a line of text, trimmed. Empty input is allowed.
///
/// # Errors
///
/// * If the terminal cannot be read
pub fn prompt_text(prompt: &str, default: Option<&str>) -> Result<String, dialoguer::Error> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    Ok(input.interact_text()?.trim().to_string())
}
