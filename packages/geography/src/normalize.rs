//! Comparison keys for place names.
//!
//! Normalized strings are only ever compared, never displayed.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercases, decomposes (NFD) and drops combining marks.
///
/// `"Región del Biobío"` becomes `"region del biobio"`.
#[must_use]
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Like [`normalize`], but a missing value yields the empty string.
#[must_use]
pub fn normalize_opt(input: Option<&str>) -> String {
    input.map(normalize).unwrap_or_default()
}

/// [`normalize`] with whitespace and punctuation removed.
///
/// Used for substring matching so that spacing variants such as
/// `"bio bio"` and `"Biobío"` compare equal.
#[must_use]
pub fn match_key(input: &str) -> String {
    normalize(input)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}
