//! Growth-path construction for the explicit projection period.

use intrinsic_common::numeric::{clamp, median};

/// A three-phase mature growth path plus its anchor rates.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthPath {
    pub rates: Vec<f64>,
    pub g_short: f64,
    pub g_mid: f64,
}

/// Build the mature three-phase growth path.
///
/// Phase one holds the short-term rate (the median of the positive growth
/// signals, clamped to [4%, 12%], or 1% when the median is under 2%),
/// phase two fades toward a mid rate, phase three fades into terminal
/// growth. Phase boundaries land at roughly 30% and 70% of the horizon.
pub fn build_growth_path(
    horizon_years: i32,
    g_terminal: f64,
    fcf_cagr: Option<f64>,
    revenue_cagr: Option<f64>,
    roic_growth: Option<f64>,
) -> GrowthPath {
    let horizon = horizon_years.max(1);
    let candidates: Vec<f64> = [fcf_cagr, revenue_cagr, roic_growth]
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    let g_short = match median(&candidates) {
        Some(raw) if raw < 0.02 => 0.01,
        Some(raw) => clamp(Some(raw), 0.04, 0.12),
        None => 0.02,
    };
    let g_mid = clamp(Some((g_short + g_terminal) / 2.0), 0.03, 0.08);

    let phase1_end = horizon.min(round_half_even(0.3 * f64::from(horizon)).max(1));
    let phase2_end = horizon.min(round_half_even(0.7 * f64::from(horizon)).max(phase1_end + 1));

    let mut rates = Vec::with_capacity(horizon as usize);
    for year in 1..=horizon {
        let rate = if year <= phase1_end {
            g_short
        } else if year <= phase2_end {
            let span = (phase2_end - phase1_end).max(1);
            let progress = f64::from(year - phase1_end) / f64::from(span);
            g_short + (g_mid - g_short) * progress
        } else {
            let span = (horizon - phase2_end).max(1);
            let progress = f64::from(year - phase2_end) / f64::from(span);
            g_mid + (g_terminal - g_mid) * progress
        };
        rates.push(rate);
    }

    GrowthPath {
        rates,
        g_short,
        g_mid,
    }
}

/// Revenue growth path for hypergrowth companies: a flat high-growth
/// phase, then a straight fade into the terminal revenue rate.
pub fn build_hypergrowth_revenue_path(
    horizon: i32,
    high_growth_years: i32,
    phase1_growth: f64,
    terminal_growth: f64,
) -> Vec<f64> {
    let horizon = horizon.max(1);
    let phase1_years = high_growth_years.min(horizon);
    let phase1_growth = clamp(Some(phase1_growth), 0.10, 0.60);
    let terminal_growth = clamp(Some(terminal_growth), 0.03, 0.10);

    let mut rates = Vec::with_capacity(horizon as usize);
    for year in 1..=horizon {
        let rate = if year <= phase1_years {
            phase1_growth
        } else {
            let span = (horizon - phase1_years).max(1);
            let progress = f64::from(year - phase1_years) / f64::from(span);
            phase1_growth + (terminal_growth - phase1_growth) * progress
        };
        rates.push(rate);
    }
    rates
}

/// FCFF-margin path for hypergrowth companies: a straight line from the
/// starting margin to the terminal margin across the horizon.
pub fn build_hypergrowth_margin_path(
    start_margin: f64,
    terminal_margin: f64,
    horizon: i32,
) -> Vec<f64> {
    let horizon = horizon.max(1);
    let start = clamp(Some(start_margin), 0.02, 0.45);
    let terminal = clamp(Some(terminal_margin), 0.05, 0.50);
    if horizon == 1 {
        return vec![terminal];
    }
    (0..horizon)
        .map(|idx| {
            let progress = f64::from(idx) / f64::from(horizon - 1);
            start + (terminal - start) * progress
        })
        .collect()
}

// ===== Helper Functions =====

/// Round with ties going to the even neighbor, as the phase boundaries
/// were calibrated against.
fn round_half_even(value: f64) -> i32 {
    value.round_ties_even() as i32
}
