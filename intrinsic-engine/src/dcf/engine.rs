//! Valuation orchestration.
//!
//! [`DcfEngine::run`] ties the pieces together: normalize the base FCFF,
//! classify the archetype, pick the scenario bundle, build growth paths,
//! project and discount, and bridge enterprise value down to an implied
//! share price. The run is deterministic: the same request always yields
//! the same result.

use intrinsic_common::numeric::{clamp, safe_f64, sanitize};
use intrinsic_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::archetype::classify_archetype;
use super::growth::{
    build_growth_path, build_hypergrowth_margin_path, build_hypergrowth_revenue_path,
};
use super::normalize::{
    fcf_cagr_5y, normalized_base_fcff, normalized_roic, reinvestment_rate,
    resolve_terminal_growth, roic_implied_growth,
};
use super::projector::{
    project_fcff, project_fcff_hypergrowth, FallbackReason, HypergrowthMeta, Projection,
};
use super::scenario::{scenario_config, ScenarioConfig};
use super::types::{Archetype, ScenarioPreset, ValuationResult, ValuationSettings};
use crate::cost_of_capital::CostOfCapitalSnapshot;
use crate::metrics::FinancialMetricsSnapshot;

/// Version tag echoed in every valuation's settings.
pub const ENGINE_VERSION: &str = "v2";

// ===== Configuration =====

fn default_horizon_years() -> i32 {
    10
}

fn default_wacc() -> f64 {
    0.08
}

/// Engine fallbacks used when a request carries no usable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Projection horizon when neither scenario nor caller pins one.
    #[serde(default = "default_horizon_years")]
    pub default_horizon_years: i32,

    /// Discount rate when the cost-of-capital block is missing or broken.
    #[serde(default = "default_wacc")]
    pub default_wacc: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_horizon_years: default_horizon_years(),
            default_wacc: default_wacc(),
        }
    }
}

// ===== Request =====

/// A full valuation request.
///
/// `horizon_years`, `g_terminal` and `scenario` are caller overrides;
/// every one of them is optional and scenario bundles may override the
/// horizon anyway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValuationRequest {
    pub metrics: FinancialMetricsSnapshot,
    pub cost_of_capital: CostOfCapitalSnapshot,
    pub horizon_years: Option<i32>,
    pub g_terminal: Option<f64>,
    pub scenario: Option<String>,
}

// ===== Engine =====

/// The deterministic DCF valuation engine.
#[derive(Debug, Clone, Default)]
pub struct DcfEngine {
    config: EngineConfig,
}

struct HypergrowthOutcome {
    projection: Projection,
    meta: HypergrowthMeta,
    g_short: Option<f64>,
    g_mid: Option<f64>,
    projection_start: f64,
}

impl DcfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a valuation.
    ///
    /// Fails only when no positive base FCFF can be established; every
    /// other data gap degrades to a documented fallback instead.
    pub fn run(&self, request: &ValuationRequest) -> Result<ValuationResult> {
        let metrics = &request.metrics;
        let fcf_values = metrics.fcf_values();

        let base_candidate = metrics
            .base_year_fcff_normalized
            .and_then(sanitize)
            .or_else(|| metrics.base_fcf.and_then(sanitize));
        let base_fcff = normalized_base_fcff(&fcf_values, base_candidate).ok_or_else(|| {
            Error::NoBaseCashFlow("no positive cash flow history or base candidate".to_string())
        })?;

        let wacc = match request
            .cost_of_capital
            .wacc
            .filter(|w| w.is_finite() && *w > 0.0)
        {
            Some(w) => w,
            None => {
                warn!(
                    "No usable WACC supplied; discounting at the {:.4} default",
                    self.config.default_wacc
                );
                self.config.default_wacc
            }
        };

        let revenue_last = metrics.revenue_last.and_then(sanitize);
        let fcf_cagr = fcf_cagr_5y(&fcf_values);
        let archetype = classify_archetype(metrics, fcf_cagr);
        let preset = ScenarioPreset::parse(request.scenario.as_deref().unwrap_or("base"));
        let config = scenario_config(preset, archetype);

        let revenue_cagr = metrics.revenue_cagr_5y.and_then(sanitize);
        let reinvestment = reinvestment_rate(&metrics.nopat_history, &metrics.fcf_series);
        let roic = normalized_roic(&metrics.roic_history);
        let roic_growth = roic_implied_growth(roic, reinvestment);

        let wacc = clamp(Some(wacc + config.wacc_shift), config.wacc_min, config.wacc_max);

        let horizon_hint = metrics
            .horizon_years
            .filter(|h| h.is_finite())
            .map(|h| h as i32)
            .filter(|h| *h != 0);
        let effective_horizon = config.horizon_override.or(horizon_hint).unwrap_or_else(|| {
            request
                .horizon_years
                .unwrap_or(self.config.default_horizon_years)
        });
        let g_terminal_used = resolve_terminal_growth(
            request.g_terminal,
            revenue_cagr,
            config.g_terminal_min,
            config.g_terminal_max,
        );

        debug!(
            "Valuation inputs: archetype={}, preset={}, wacc={:.4}, horizon={}, gTerminal={:.4}",
            archetype, preset, wacc, effective_horizon, g_terminal_used
        );

        let use_hyper =
            archetype == Archetype::Hypergrowth && revenue_last.is_some_and(|r| r > 0.0);
        let hyper_outcome = if use_hyper {
            match self.attempt_hypergrowth(
                metrics,
                base_fcff,
                &config,
                effective_horizon,
                wacc,
                g_terminal_used,
            ) {
                Ok(outcome) => Some(outcome),
                Err(reason) => {
                    warn!("Hypergrowth projection abandoned ({reason}); using the mature path");
                    None
                }
            }
        } else {
            None
        };

        let (projection, hyper_meta, g_short, g_mid, projection_start) = match hyper_outcome {
            Some(outcome) => (
                outcome.projection,
                outcome.meta,
                outcome.g_short,
                outcome.g_mid,
                outcome.projection_start,
            ),
            None => {
                let path = build_growth_path(
                    effective_horizon,
                    g_terminal_used,
                    fcf_cagr,
                    revenue_cagr,
                    roic_growth,
                );
                let projection_start =
                    tilt_projection_start(base_fcff, config.base_fcff_forward_tilt, path.g_short);
                let projection = project_fcff(
                    projection_start,
                    &path.rates,
                    wacc,
                    g_terminal_used,
                    metrics.base_year,
                );
                (
                    projection,
                    HypergrowthMeta::default(),
                    Some(path.g_short),
                    Some(path.g_mid),
                    projection_start,
                )
            }
        };

        let enterprise_value = projection.pv_explicit + projection.terminal.pv_tv.unwrap_or(0.0);
        let net_debt = safe_f64(metrics.net_debt, 0.0);
        let equity_value = enterprise_value - net_debt;
        let shares = safe_f64(metrics.shares_outstanding, 0.0);
        let implied_share_price = (shares > 0.0).then(|| equity_value / shares);

        debug!(
            "Valuation complete: ev={enterprise_value:.0}, equity={equity_value:.0}, years={}",
            projection.forecast.len()
        );

        Ok(ValuationResult {
            settings: ValuationSettings {
                horizon_years: effective_horizon,
                horizon_years_used: effective_horizon,
                g_terminal: g_terminal_used,
                g_terminal_used,
                engine_version: ENGINE_VERSION.to_string(),
                wacc,
                wacc_used: wacc,
                growth_short: g_short,
                growth_mid: g_mid,
                base_fcff_normalized: base_fcff,
                base_fcff_projection_start: projection_start,
                scenario_preset: config.name,
                archetype,
                revenue_cagr_5y_used: revenue_cagr,
                fcff_margin_start: hyper_meta.fcff_margin_start,
                fcff_margin_terminal: hyper_meta.fcff_margin_terminal,
                growth_phase1_rev: hyper_meta.growth_phase1_rev,
                growth_phase2_rev: hyper_meta.growth_phase2_rev,
            },
            fcff_forecast: projection.forecast,
            terminal_value: projection.terminal,
            enterprise_value,
            equity_value,
            implied_share_price,
            base_fcff,
        })
    }

    /// Try the revenue-driven hypergrowth projection.
    ///
    /// Any reason it cannot stand up (no usable revenue, degenerate
    /// margin) comes back as a [`FallbackReason`] and the caller reruns
    /// the mature path with the untilted base.
    fn attempt_hypergrowth(
        &self,
        metrics: &FinancialMetricsSnapshot,
        base_fcff: f64,
        config: &ScenarioConfig,
        horizon: i32,
        wacc: f64,
        g_terminal: f64,
    ) -> std::result::Result<HypergrowthOutcome, FallbackReason> {
        let revenue_last = metrics
            .revenue_last
            .and_then(sanitize)
            .filter(|r| *r > 0.0)
            .ok_or(FallbackReason::InvalidRevenue)?;
        let revenue_cagr = metrics.revenue_cagr_5y.and_then(sanitize);

        let growth_hint = revenue_cagr.unwrap_or(config.rev_phase1_min);
        let phase1_growth = clamp(
            Some(growth_hint),
            config.rev_phase1_min,
            config.rev_phase1_max,
        );
        let revenue_growth_path = build_hypergrowth_revenue_path(
            horizon,
            config.high_growth_years,
            phase1_growth,
            config.rev_terminal,
        );
        let g_short = revenue_growth_path.first().copied();
        let g_mid = match (revenue_growth_path.first(), revenue_growth_path.last()) {
            (Some(first), Some(last)) => Some((first + last) / 2.0),
            _ => None,
        };

        let projection_start = match g_short {
            Some(gs) => tilt_projection_start(base_fcff, config.base_fcff_forward_tilt, gs),
            None => base_fcff,
        };
        let margin_start = projection_start / revenue_last;
        if margin_start <= 0.0 {
            return Err(FallbackReason::NonPositiveMargin);
        }
        let margin_terminal = margin_start + config.margin_uplift;
        let margin_path = build_hypergrowth_margin_path(
            margin_start,
            margin_terminal,
            revenue_growth_path.len() as i32,
        );

        let (projection, meta) = project_fcff_hypergrowth(
            revenue_last,
            &revenue_growth_path,
            &margin_path,
            wacc,
            g_terminal,
            metrics.base_year,
        )?;

        Ok(HypergrowthOutcome {
            projection,
            meta,
            g_short,
            g_mid,
            projection_start,
        })
    }
}

// ===== Helper Functions =====

/// Pull a fraction of next year's growth into the projection seed, then
/// deflate by one growth step so the first projected year does not double
/// count it.
fn tilt_projection_start(base_fcff: f64, tilt_fraction: f64, g_short: f64) -> f64 {
    if tilt_fraction > 0.0 {
        base_fcff * (1.0 + tilt_fraction * g_short) / (1.0 + g_short)
    } else {
        base_fcff
    }
}
