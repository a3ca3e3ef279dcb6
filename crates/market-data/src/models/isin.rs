//! ISIN validation and normalization.
//!
//! Every instrument in the system is keyed by its ISIN: a 12-character code
//! made of a 2-letter country prefix, 9 alphanumeric characters, and a
//! numeric check digit (e.g. `IE00B4L5Y983`).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISIN_PATTERN: Regex = Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").expect("valid regex");
}

/// Expected length of an ISIN code.
pub const ISIN_LENGTH: usize = 12;

/// Check whether `code` is a structurally valid ISIN.
///
/// Validation runs against the trimmed, upper-cased form but the input is
/// never mutated — callers normalize with [`normalize`] before storing.
/// Returns `false` for empty or malformed input; never panics.
pub fn is_valid(code: &str) -> bool {
    let normalized = code.trim().to_uppercase();
    if normalized.len() != ISIN_LENGTH {
        return false;
    }
    ISIN_PATTERN.is_match(&normalized)
}

/// Normalize an ISIN for storage and lookup (trim + uppercase).
///
/// Returns an empty string for empty input; does not validate.
pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}
