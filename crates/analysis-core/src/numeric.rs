//! Numeric guards shared by every engine.
//!
//! Ratios, scores and estimates pass through these helpers so that a missing,
//! zero or non-finite input collapses to `None` instead of reaching JSON as
//! NaN or infinity.

/// Keep a value only if it is a finite real number.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Division guarded against a missing or zero divisor and a non-finite quotient.
pub fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    finite(Some(n / d))
}

/// Linear clamp-to-range scaling of `value` from [lo, hi] onto [0, 100].
///
/// A degenerate range (lo == hi) yields the midpoint 50.
pub fn normalize(value: Option<f64>, lo: f64, hi: f64) -> Option<f64> {
    let v = finite(value)?;
    if hi == lo {
        return Some(50.0);
    }
    Some(((v - lo) / (hi - lo) * 100.0).clamp(0.0, 100.0))
}

/// Inverted scaling: `lo` maps to 100 and `hi` maps to 0.
pub fn normalize_inverse(value: Option<f64>, lo: f64, hi: f64) -> Option<f64> {
    let v = finite(value)?;
    if hi == lo {
        return Some(50.0);
    }
    Some(((hi - v) / (hi - lo) * 100.0).clamp(0.0, 100.0))
}

/// Weighted average over (value, weight) pairs that ignores absent values and
/// renormalises over the weight that remains.
///
/// Returns `None` when no value carries positive weight. The result is rounded
/// to one decimal, which is the precision the recommendation tiers work on.
pub fn weighted_average(pairs: &[(Option<f64>, f64)]) -> Option<f64> {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;
    for (value, weight) in pairs {
        if let Some(v) = finite(*value) {
            total_score += v * weight;
            total_weight += weight;
        }
    }
    if total_weight == 0.0 {
        return None;
    }
    finite(Some(round_to(total_score / total_weight, 1)))
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rescale a percentage-like quantity that arrived as a decimal fraction.
pub fn decimal_to_percent(value: Option<f64>) -> Option<f64> {
    finite(value).map(|v| if v.abs() < 1.0 { v * 100.0 } else { v })
}
