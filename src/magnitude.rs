//! Magnitude codes for monetary damage fields.
//!
//! `PROPDMGEXP`/`CROPDMGEXP` carry a single-letter multiplier for the base
//! value. Only the three upper-case codes below are recognised; every other
//! code (blank, lower-case, `H`, digits, `+`, `?`) scales by one.
//!
//! Unrecognised codes may be upstream data-quality artifacts rather than
//! genuine unscaled amounts; they still scale by one.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static MAGNITUDE_FACTORS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([("B", 1e9), ("M", 1e6), ("K", 1e3)])
});

/// Multiplier for a magnitude code. Exact match, no trimming or case folding.
pub fn magnitude_factor(code: &str) -> f64 {
    MAGNITUDE_FACTORS.get(code).copied().unwrap_or(1.0)
}

/// Base value scaled by its magnitude code; a missing base counts as zero.
pub fn normalized_amount(base: Option<f64>, code: &str) -> f64 {
    base.unwrap_or(0.0) * magnitude_factor(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(magnitude_factor("B"), 1e9);
        assert_eq!(magnitude_factor("M"), 1e6);
        assert_eq!(magnitude_factor("K"), 1e3);
    }

    #[test]
    fn test_unknown_codes_scale_by_one() {
        for code in ["", "m", "k", "b", "H", "h", "0", "5", "+", "-", "?", "Z", " M"] {
            assert_eq!(magnitude_factor(code), 1.0, "code {code:?}");
        }
    }

    #[test]
    fn test_normalized_amount() {
        assert_eq!(normalized_amount(Some(2.5), "M"), 2_500_000.0);
        assert_eq!(normalized_amount(Some(2.5), "Z"), 2.5);
        assert_eq!(normalized_amount(None, "B"), 0.0);
    }
}
