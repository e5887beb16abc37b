//! Normalisation helpers for fundamentals that may be absent or non-finite.
//!
//! Upstream metric feeds routinely omit fields or hand back NaN for ratios with a
//! zero denominator. Everything downstream goes through these helpers first so that
//! no NaN or infinity ever reaches a price or score.

/// Keep the value only if it is present and finite.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Present, finite and strictly positive.
pub fn positive(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v > 0.0)
}

/// Missing or invalid values count as zero.
pub fn or_zero(value: Option<f64>) -> f64 {
    finite(value).unwrap_or(0.0)
}

/// Replace a non-finite number with `default`.
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Percent units (12.5) to a fraction (0.125).
pub fn percent_to_fraction(value: f64) -> f64 {
    value / 100.0
}

/// Round to `decimals` places, mapping non-finite input to 0.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
