//! Numeric guardrails shared by every engine component.
//!
//! Financial inputs arrive with gaps, zeros, and the occasional NaN from
//! upstream data vendors. Every boundary value passes through these helpers
//! so that non-finite values never survive past an extraction point.

use std::cmp::Ordering;

/// Clamp `value` to `[lower, upper]`.
///
/// Absent or non-finite values collapse to the lower bound.
pub fn clamp(value: Option<f64>, lower: f64, upper: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.max(lower).min(upper),
        _ => lower,
    }
}

/// Resolve `value` to a finite f64, falling back to `default` when the
/// value is absent or non-finite.
pub fn safe_f64(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

/// Map non-finite values to `None` so they serialize as absent rather
/// than as NaN/Infinity.
pub fn sanitize(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Median of a slice; `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean of a slice; `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Keep only strictly positive finite values, preserving order.
pub fn positive_finite(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect()
}
