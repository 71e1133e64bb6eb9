//! Scenario assumption bundles.
//!
//! Each archetype/preset pair maps to a fixed set of assumptions. The
//! numbers are tuned, not derived; change them only as a deliberate
//! calibration.

use serde::{Deserialize, Serialize};

use super::types::{Archetype, ScenarioPreset};

/// Assumptions for one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    pub name: ScenarioPreset,
    /// Additive WACC adjustment applied before the band clamp.
    pub wacc_shift: f64,
    pub wacc_min: f64,
    pub wacc_max: f64,
    pub g_terminal_min: f64,
    pub g_terminal_max: f64,
    /// Fixed horizon for this scenario; `None` defers to caller hints.
    pub horizon_override: Option<i32>,
    /// Fraction of next-year growth pulled into the projection seed.
    pub base_fcff_forward_tilt: f64,
    /// Years of flat phase-one growth on the hypergrowth revenue path.
    pub high_growth_years: i32,
    pub rev_phase1_min: f64,
    pub rev_phase1_max: f64,
    pub rev_terminal: f64,
    /// Additive FCFF-margin expansion over the horizon (hypergrowth).
    pub margin_uplift: f64,
}

/// Look up the assumption bundle for an archetype/preset pair.
pub fn scenario_config(preset: ScenarioPreset, archetype: Archetype) -> ScenarioConfig {
    match (archetype, preset) {
        (Archetype::Hypergrowth, ScenarioPreset::Conservative) => ScenarioConfig {
            name: preset,
            wacc_shift: 0.005,
            wacc_min: 0.072,
            wacc_max: 0.09,
            g_terminal_min: 0.028,
            g_terminal_max: 0.034,
            horizon_override: Some(10),
            base_fcff_forward_tilt: 0.15,
            high_growth_years: 8,
            rev_phase1_min: 0.18,
            rev_phase1_max: 0.30,
            rev_terminal: 0.055,
            margin_uplift: 0.02,
        },
        (Archetype::Hypergrowth, ScenarioPreset::Base) => ScenarioConfig {
            name: preset,
            wacc_shift: 0.0,
            wacc_min: 0.065,
            wacc_max: 0.085,
            g_terminal_min: 0.03,
            g_terminal_max: 0.04,
            horizon_override: Some(12),
            base_fcff_forward_tilt: 0.3,
            high_growth_years: 10,
            rev_phase1_min: 0.24,
            rev_phase1_max: 0.4,
            rev_terminal: 0.07,
            margin_uplift: 0.05,
        },
        (Archetype::Hypergrowth, ScenarioPreset::Optimistic) => ScenarioConfig {
            name: preset,
            wacc_shift: -0.01,
            wacc_min: 0.06,
            wacc_max: 0.08,
            g_terminal_min: 0.032,
            g_terminal_max: 0.05,
            horizon_override: Some(15),
            base_fcff_forward_tilt: 0.5,
            high_growth_years: 12,
            rev_phase1_min: 0.28,
            rev_phase1_max: 0.45,
            rev_terminal: 0.08,
            margin_uplift: 0.08,
        },
        (Archetype::Mature, ScenarioPreset::Conservative) => ScenarioConfig {
            name: preset,
            wacc_shift: 0.01,
            wacc_min: 0.08,
            wacc_max: 0.11,
            g_terminal_min: 0.02,
            g_terminal_max: 0.027,
            horizon_override: Some(8),
            base_fcff_forward_tilt: 0.0,
            high_growth_years: 4,
            rev_phase1_min: 0.05,
            rev_phase1_max: 0.08,
            rev_terminal: 0.03,
            margin_uplift: 0.0,
        },
        (Archetype::Mature, ScenarioPreset::Base) => ScenarioConfig {
            name: preset,
            wacc_shift: 0.0,
            wacc_min: 0.07,
            wacc_max: 0.10,
            g_terminal_min: 0.025,
            g_terminal_max: 0.033,
            horizon_override: None,
            base_fcff_forward_tilt: 0.25,
            high_growth_years: 5,
            rev_phase1_min: 0.06,
            rev_phase1_max: 0.09,
            rev_terminal: 0.032,
            margin_uplift: 0.01,
        },
        (Archetype::Mature, ScenarioPreset::Optimistic) => ScenarioConfig {
            name: preset,
            wacc_shift: -0.01,
            wacc_min: 0.06,
            wacc_max: 0.09,
            g_terminal_min: 0.028,
            g_terminal_max: 0.035,
            horizon_override: Some(12),
            base_fcff_forward_tilt: 0.4,
            high_growth_years: 6,
            rev_phase1_min: 0.08,
            rev_phase1_max: 0.12,
            rev_terminal: 0.035,
            margin_uplift: 0.03,
        },
    }
}
