//! Wire types for valuation results.
//!
//! Field names follow the published camelCase contract. Optional numbers
//! serialize as `null` when a value could not be computed; NaN and
//! infinities never reach the wire.

use serde::{Deserialize, Serialize};

/// Company growth archetype driving scenario assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Mature,
    Hypergrowth,
}

impl Archetype {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mature => "mature",
            Self::Hypergrowth => "hypergrowth",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scenario preset selector.
///
/// Parsing is deliberately forgiving: anything unrecognized falls back to
/// [`ScenarioPreset::Base`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioPreset {
    Conservative,
    #[default]
    Base,
    Optimistic,
}

impl ScenarioPreset {
    /// Parse a caller-supplied preset name, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "conservative" => Self::Conservative,
            "optimistic" => Self::Optimistic,
            _ => Self::Base,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Base => "base",
            Self::Optimistic => "optimistic",
        }
    }
}

impl std::fmt::Display for ScenarioPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One forecast year of the explicit projection period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastYear {
    pub year: i32,
    pub growth: Option<f64>,
    pub fcff: Option<f64>,
    pub discount_factor: Option<f64>,
    pub pv_fcff: Option<f64>,
    /// Projected revenue; only populated on the hypergrowth path.
    pub revenue: Option<f64>,
    /// FCFF margin on revenue; only populated on the hypergrowth path.
    pub fcff_margin: Option<f64>,
}

/// Terminal value block of a valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalValueSummary {
    pub fcff_terminal: Option<f64>,
    pub g_terminal: Option<f64>,
    /// Reserved; always `null` in the current engine.
    pub terminal_reinvestment_rate: Option<f64>,
    pub tv: Option<f64>,
    pub pv_tv: Option<f64>,
}

/// Resolved assumptions echoed back with every valuation.
///
/// The `...Used` twins repeat their primary key; older consumers read one
/// spelling, newer ones the other, and both stay in the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSettings {
    pub horizon_years: i32,
    pub horizon_years_used: i32,
    pub g_terminal: f64,
    pub g_terminal_used: f64,
    pub engine_version: String,
    pub wacc: f64,
    pub wacc_used: f64,
    pub growth_short: Option<f64>,
    pub growth_mid: Option<f64>,
    pub base_fcff_normalized: f64,
    pub base_fcff_projection_start: f64,
    pub scenario_preset: ScenarioPreset,
    pub archetype: Archetype,
    #[serde(rename = "revenueCAGR5YUsed")]
    pub revenue_cagr_5y_used: Option<f64>,
    pub fcff_margin_start: Option<f64>,
    pub fcff_margin_terminal: Option<f64>,
    pub growth_phase1_rev: Option<f64>,
    pub growth_phase2_rev: Option<f64>,
}

/// A complete valuation: assumptions, forecast, terminal block and the
/// resulting value bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub settings: ValuationSettings,
    pub fcff_forecast: Vec<ForecastYear>,
    pub terminal_value: TerminalValueSummary,
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub implied_share_price: Option<f64>,
    pub base_fcff: f64,
}
