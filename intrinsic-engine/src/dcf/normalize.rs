//! Base-FCFF normalization and growth-signal estimation.
//!
//! These helpers turn noisy reported history into the handful of numbers
//! the projection actually runs on: a normalized base FCFF, an FCF CAGR,
//! a reinvestment rate, a normalized ROIC, and a resolved terminal growth.
//! All of them tolerate missing or partial history and answer `None`
//! rather than guessing.

use intrinsic_common::numeric::{clamp, mean, median, positive_finite};

use crate::metrics::{FcfObservation, NopatObservation, RoicObservation};

/// Normalize the base FCFF from recent history with outlier trimming.
///
/// Positive observations (most recent first) plus the positive candidate
/// are medianed over the first five; values more than 50% away from the
/// median are dropped; the survivors get linearly decaying weights with
/// the newest counting most. A non-positive blend falls back to the
/// candidate.
pub fn normalized_base_fcff(values: &[f64], base_candidate: Option<f64>) -> Option<f64> {
    let mut valid = positive_finite(values);
    let candidate = base_candidate.filter(|c| c.is_finite() && *c > 0.0);
    if let Some(c) = candidate {
        valid.push(c);
    }
    if valid.len() < 2 {
        return candidate;
    }

    let recent = &valid[..valid.len().min(5)];
    let med = median(recent)?;
    let mut trimmed: Vec<f64> = if med == 0.0 {
        recent.to_vec()
    } else {
        recent
            .iter()
            .copied()
            .filter(|v| ((v - med) / med).abs() <= 0.5)
            .collect()
    };
    if trimmed.is_empty() {
        trimmed = recent.to_vec();
    }

    let weight_sum: usize = (1..=trimmed.len()).sum();
    let weighted: f64 = trimmed
        .iter()
        .zip((1..=trimmed.len()).rev())
        .map(|(v, w)| v * w as f64)
        .sum();
    let normalized = weighted / weight_sum as f64;
    if normalized <= 0.0 {
        return candidate;
    }
    Some(normalized)
}

/// FCF CAGR over up to five recent positive observations.
pub fn fcf_cagr_5y(values: &[f64]) -> Option<f64> {
    let usable = positive_finite(values);
    if usable.len() < 2 {
        return None;
    }
    let oldest_index = (usable.len() - 1).min(4);
    let recent = usable[0];
    let oldest = usable[oldest_index];
    let years = oldest_index as f64;
    Some((recent / oldest).powf(1.0 / years) - 1.0)
}

/// Average reinvestment rate, approximated as `1 - FCFF/NOPAT` over up to
/// five overlapping profitable years.
pub fn reinvestment_rate(
    nopat_history: &[NopatObservation],
    fcf_series: &[FcfObservation],
) -> Option<f64> {
    if nopat_history.is_empty() || fcf_series.is_empty() {
        return None;
    }

    let mut fcff_by_year = std::collections::BTreeMap::new();
    for entry in fcf_series {
        let (Some(year), Some(value)) = (entry.resolved_year(), entry.value) else {
            continue;
        };
        if value.is_finite() {
            fcff_by_year.insert(year, value);
        }
    }

    let mut reinvestments = Vec::new();
    for entry in nopat_history {
        if reinvestments.len() >= 5 {
            break;
        }
        let (Some(year), Some(nopat)) = (entry.year, entry.nopat) else {
            continue;
        };
        let Some(&fcff) = fcff_by_year.get(&year) else {
            continue;
        };
        if nopat <= 0.0 || fcff <= 0.0 {
            continue;
        }
        reinvestments.push(clamp(Some(1.0 - fcff / nopat), 0.0, 0.6));
    }
    mean(&reinvestments)
}

/// Normalized ROIC: up to five plausible observations, min and max dropped
/// when three or more remain, averaged and clamped to [5%, 40%].
pub fn normalized_roic(roic_history: &[RoicObservation]) -> Option<f64> {
    let mut values = Vec::new();
    for entry in roic_history {
        if values.len() >= 5 {
            break;
        }
        let Some(value) = entry.roic else { continue };
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            values.push(value);
        }
    }
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let trimmed = if values.len() >= 3 {
        &values[1..values.len() - 1]
    } else {
        &values[..]
    };
    mean(trimmed).map(|avg| clamp(Some(avg), 0.05, 0.40))
}

/// Sustainable-growth estimate: `ROIC * reinvestment`, capped at 15%.
pub fn roic_implied_growth(
    normalized_roic: Option<f64>,
    reinvestment_rate: Option<f64>,
) -> Option<f64> {
    let roic = normalized_roic?;
    let rate = reinvestment_rate?;
    Some(clamp(Some(roic * rate), 0.0, 0.15))
}

/// Resolve terminal growth inside the scenario band.
///
/// An explicit finite input is clamped and used as-is. Otherwise the rate
/// is derived from revenue growth: half the (capped) revenue CAGR on top
/// of a 2% floor.
pub fn resolve_terminal_growth(
    g_terminal_input: Option<f64>,
    revenue_cagr: Option<f64>,
    min_val: f64,
    max_val: f64,
) -> f64 {
    if let Some(g) = g_terminal_input.filter(|g| g.is_finite()) {
        return clamp(Some(g), min_val, max_val);
    }
    let rev = revenue_cagr.filter(|r| r.is_finite()).unwrap_or(0.03);
    let rev = clamp(Some(rev), 0.0, 0.06);
    clamp(Some(0.02 + 0.5 * rev), min_val, max_val)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fcf_obs(year: i32, value: f64) -> FcfObservation {
        FcfObservation {
            label: None,
            year: Some(year),
            value: Some(value),
        }
    }

    fn nopat_obs(year: i32, nopat: f64) -> NopatObservation {
        NopatObservation {
            year: Some(year),
            nopat: Some(nopat),
        }
    }

    fn roic_obs(roic: f64) -> RoicObservation {
        RoicObservation {
            year: None,
            roic: Some(roic),
        }
    }

    #[test]
    fn test_normalized_base_fcff_trims_outliers() {
        // 800M is more than 50% away from the median and gets dropped
        let values = [200.0e6, 195.0e6, 205.0e6, 800.0e6];
        let normalized = normalized_base_fcff(&values, None).unwrap();
        // Weighted blend of [200, 195, 205] with weights [3, 2, 1]
        let expected = (200.0e6 * 3.0 + 195.0e6 * 2.0 + 205.0e6) / 6.0;
        assert!((normalized - expected).abs() < 1.0);
    }

    #[test]
    fn test_normalized_base_fcff_single_value_returns_candidate() {
        assert_eq!(normalized_base_fcff(&[], Some(150.0)), Some(150.0));
        assert_eq!(normalized_base_fcff(&[120.0], None), None);
        // Negative history is ignored entirely
        assert_eq!(normalized_base_fcff(&[-50.0, -60.0], Some(100.0)), Some(100.0));
    }

    #[test]
    fn test_normalized_base_fcff_appends_candidate_to_history() {
        let normalized = normalized_base_fcff(&[100.0], Some(120.0)).unwrap();
        // Weights [2, 1] over [100, 120]
        assert!((normalized - (100.0 * 2.0 + 120.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_base_fcff_ignores_non_positive_candidate() {
        assert_eq!(normalized_base_fcff(&[], Some(-10.0)), None);
        assert_eq!(normalized_base_fcff(&[], Some(f64::NAN)), None);
    }

    #[test]
    fn test_fcf_cagr_uses_at_most_five_points() {
        // Seven observations; only the first five count
        let values = [161.051, 146.41, 133.1, 121.0, 110.0, 100.0, 90.0];
        let cagr = fcf_cagr_5y(&values).unwrap();
        // (161.051 / 110) ^ (1/4) - 1 = 10%
        assert!((cagr - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_fcf_cagr_needs_two_positives() {
        assert_eq!(fcf_cagr_5y(&[100.0]), None);
        assert_eq!(fcf_cagr_5y(&[100.0, -50.0]), None);
        assert!(fcf_cagr_5y(&[110.0, 100.0]).is_some());
    }

    #[test]
    fn test_reinvestment_rate_matches_by_year() {
        let nopat = vec![nopat_obs(2024, 200.0), nopat_obs(2023, 180.0)];
        let fcf = vec![fcf_obs(2024, 120.0), fcf_obs(2023, 126.0)];
        let rate = reinvestment_rate(&nopat, &fcf).unwrap();
        // (1 - 120/200) and (1 - 126/180) average to 0.35
        assert!((rate - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_reinvestment_rate_skips_unprofitable_years() {
        let nopat = vec![nopat_obs(2024, -50.0), nopat_obs(2023, 100.0)];
        let fcf = vec![fcf_obs(2024, 30.0), fcf_obs(2023, 80.0)];
        let rate = reinvestment_rate(&nopat, &fcf).unwrap();
        assert!((rate - 0.2).abs() < 1e-9);

        assert_eq!(reinvestment_rate(&[], &fcf), None);
    }

    #[test]
    fn test_reinvestment_rate_clamped_to_sixty_percent() {
        let nopat = vec![nopat_obs(2024, 1000.0)];
        let fcf = vec![fcf_obs(2024, 10.0)];
        assert!((reinvestment_rate(&nopat, &fcf).unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_roic_drops_extremes() {
        let history: Vec<_> = [0.08, 0.30, 0.12, 0.14, 0.10].map(roic_obs).into();
        let roic = normalized_roic(&history).unwrap();
        // Sorted [0.08 .. 0.30], extremes dropped, mean of [0.10, 0.12, 0.14]
        assert!((roic - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_roic_filters_implausible_values() {
        // 1.8 (180%) and -0.2 are discarded as data noise
        let history: Vec<_> = [1.8, -0.2, 0.15, 0.18].map(roic_obs).into();
        let roic = normalized_roic(&history).unwrap();
        assert!((roic - 0.165).abs() < 1e-9);

        assert_eq!(normalized_roic(&[]), None);
    }

    #[test]
    fn test_normalized_roic_clamps_band() {
        let history: Vec<_> = [0.02, 0.01].map(roic_obs).into();
        assert!((normalized_roic(&history).unwrap() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_roic_implied_growth_needs_both_inputs() {
        assert_eq!(roic_implied_growth(Some(0.2), None), None);
        assert_eq!(roic_implied_growth(None, Some(0.4)), None);
        let growth = roic_implied_growth(Some(0.2), Some(0.4)).unwrap();
        assert!((growth - 0.08).abs() < 1e-9);
        // 0.4 * 0.6 = 0.24 caps at 0.15
        assert!((roic_implied_growth(Some(0.4), Some(0.6)).unwrap() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_terminal_growth_explicit_input_wins() {
        assert!((resolve_terminal_growth(Some(0.05), Some(0.01), 0.02, 0.03) - 0.03).abs() < 1e-9);
        assert!((resolve_terminal_growth(Some(0.022), None, 0.02, 0.03) - 0.022).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_terminal_growth_derives_from_revenue() {
        // 0.02 + 0.5 * 0.04 = 0.04, capped to the band
        assert!((resolve_terminal_growth(None, Some(0.04), 0.015, 0.035) - 0.035).abs() < 1e-9);
        // Default revenue assumption of 3% gives 0.035
        assert!((resolve_terminal_growth(None, None, 0.015, 0.035) - 0.035).abs() < 1e-9);
        // High CAGR is capped at 6% before halving
        assert!((resolve_terminal_growth(None, Some(0.50), 0.015, 0.06) - 0.05).abs() < 1e-9);
    }
}
