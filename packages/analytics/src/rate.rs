//! Rate per 100k population and its severity tier.

use crime_rate_crime_models::SeverityTier;

/// Population base the rate is normalized to.
pub const RATE_BASE: f64 = 100_000.0;

/// Crimes per 100k population.
///
/// Zero population yields 0 rather than NaN or infinity.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rate_per_100k(crime_count: u64, population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    crime_count as f64 / population as f64 * RATE_BASE
}

/// Rate and tier for one count/population pair.
#[must_use]
pub fn classify(crime_count: u64, population: u64) -> (f64, SeverityTier) {
    let rate = rate_per_100k(crime_count, population);
    (rate, SeverityTier::from_rate(rate))
}
