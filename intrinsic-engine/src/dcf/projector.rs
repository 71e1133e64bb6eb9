//! FCFF projection and terminal-value math.

use intrinsic_common::numeric::{clamp, sanitize};

use super::types::{ForecastYear, TerminalValueSummary};

/// Why a hypergrowth projection was abandoned in favor of the mature path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Base revenue was missing or non-positive.
    InvalidRevenue,
    /// The implied starting FCFF margin came out non-positive.
    NonPositiveMargin,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRevenue => f.write_str("invalid revenue for hypergrowth projection"),
            Self::NonPositiveMargin => f.write_str("non-positive implied fcff margin"),
        }
    }
}

/// Explicit-period forecast with its terminal block and PV sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub forecast: Vec<ForecastYear>,
    pub terminal: TerminalValueSummary,
    pub pv_explicit: f64,
}

/// Margin and revenue-growth anchors of a hypergrowth projection, echoed
/// in the valuation settings. All `None` on the mature path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HypergrowthMeta {
    pub fcff_margin_start: Option<f64>,
    pub fcff_margin_terminal: Option<f64>,
    pub growth_phase1_rev: Option<f64>,
    pub growth_phase2_rev: Option<f64>,
}

/// Project FCFF directly along a growth path and discount it.
///
/// Terminal growth is held to the hard [1.5%, 2.5%] band regardless of the
/// scenario band it was resolved in, and the terminal spread never drops
/// below 3%.
pub fn project_fcff(
    base_fcff: f64,
    growth_path: &[f64],
    wacc: f64,
    g_terminal: f64,
    base_year: Option<i32>,
) -> Projection {
    let horizon = growth_path.len();
    if horizon == 0 {
        return Projection {
            forecast: Vec::new(),
            terminal: zeroed_terminal(g_terminal),
            pv_explicit: 0.0,
        };
    }

    let wacc_safe = wacc.max(0.01);
    let g_terminal = clamp(Some(g_terminal), 0.015, 0.025);
    let mut fcff_current = base_fcff;
    let mut forecast = Vec::with_capacity(horizon);
    let mut pv_sum = 0.0;

    for (idx, growth) in growth_path.iter().enumerate() {
        let step = idx as i32 + 1;
        fcff_current *= 1.0 + growth;
        let discount_factor = 1.0 / (1.0 + wacc_safe).powi(step);
        let pv_fcff = fcff_current * discount_factor;
        pv_sum += pv_fcff;
        forecast.push(ForecastYear {
            year: base_year.map_or(step, |base| base + step),
            growth: sanitize(*growth),
            fcff: sanitize(fcff_current),
            discount_factor: sanitize(discount_factor),
            pv_fcff: sanitize(pv_fcff),
            revenue: None,
            fcff_margin: None,
        });
    }

    let last_fcff = forecast.last().and_then(|row| row.fcff);
    let denom = (wacc_safe - g_terminal).max(0.03);
    let terminal_value = last_fcff.unwrap_or(0.0) * (1.0 + g_terminal) / denom;
    let pv_terminal = terminal_value / (1.0 + wacc_safe).powi(horizon as i32);

    Projection {
        forecast,
        terminal: TerminalValueSummary {
            fcff_terminal: last_fcff,
            g_terminal: sanitize(g_terminal),
            terminal_reinvestment_rate: None,
            tv: sanitize(terminal_value),
            pv_tv: sanitize(pv_terminal),
        },
        pv_explicit: pv_sum,
    }
}

/// Project FCFF as revenue times margin along hypergrowth paths.
///
/// Terminal growth is held to [2%, 5%] and the terminal spread never drops
/// below 2.5%; hypergrowth terminals tolerate a tighter spread than the
/// mature path does.
pub fn project_fcff_hypergrowth(
    base_revenue: f64,
    revenue_growth_path: &[f64],
    margin_path: &[f64],
    wacc: f64,
    g_terminal: f64,
    base_year: Option<i32>,
) -> Result<(Projection, HypergrowthMeta), FallbackReason> {
    if base_revenue <= 0.0 {
        return Err(FallbackReason::InvalidRevenue);
    }
    let horizon = revenue_growth_path.len();
    if horizon == 0 {
        return Ok((
            Projection {
                forecast: Vec::new(),
                terminal: zeroed_terminal(g_terminal),
                pv_explicit: 0.0,
            },
            HypergrowthMeta::default(),
        ));
    }

    let wacc_safe = wacc.max(0.01);
    let g_terminal = clamp(Some(g_terminal), 0.02, 0.05);
    let mut forecast = Vec::with_capacity(horizon);
    let mut pv_sum = 0.0;
    let mut revenue = base_revenue;

    for (idx, (growth, margin)) in revenue_growth_path.iter().zip(margin_path).enumerate() {
        let step = idx as i32 + 1;
        revenue *= 1.0 + growth;
        let fcff_value = revenue * margin;
        let discount_factor = 1.0 / (1.0 + wacc_safe).powi(step);
        let pv_fcff = fcff_value * discount_factor;
        pv_sum += pv_fcff;
        forecast.push(ForecastYear {
            year: base_year.map_or(step, |base| base + step),
            growth: sanitize(*growth),
            fcff: sanitize(fcff_value),
            discount_factor: sanitize(discount_factor),
            pv_fcff: sanitize(pv_fcff),
            revenue: sanitize(revenue),
            fcff_margin: sanitize(*margin),
        });
    }

    let last_fcff = forecast.last().and_then(|row| row.fcff);
    let spread = (wacc_safe - g_terminal).max(0.025);
    let terminal_value = last_fcff.unwrap_or(0.0) * (1.0 + g_terminal) / spread;
    let pv_terminal = terminal_value / (1.0 + wacc_safe).powi(horizon as i32);

    let meta = HypergrowthMeta {
        fcff_margin_start: margin_path.first().copied().and_then(sanitize),
        fcff_margin_terminal: margin_path.last().copied().and_then(sanitize),
        growth_phase1_rev: revenue_growth_path.first().copied().and_then(sanitize),
        growth_phase2_rev: revenue_growth_path.last().copied().and_then(sanitize),
    };

    Ok((
        Projection {
            forecast,
            terminal: TerminalValueSummary {
                fcff_terminal: last_fcff,
                g_terminal: sanitize(g_terminal),
                terminal_reinvestment_rate: None,
                tv: sanitize(terminal_value),
                pv_tv: sanitize(pv_terminal),
            },
            pv_explicit: pv_sum,
        },
        meta,
    ))
}

// ===== Helper Functions =====

fn zeroed_terminal(g_terminal: f64) -> TerminalValueSummary {
    TerminalValueSummary {
        fcff_terminal: Some(0.0),
        g_terminal: sanitize(g_terminal),
        terminal_reinvestment_rate: None,
        tv: Some(0.0),
        pv_tv: Some(0.0),
    }
}
