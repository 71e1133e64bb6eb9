//! Company archetype classification.

use intrinsic_common::numeric::sanitize;

use super::types::Archetype;
use crate::metrics::FinancialMetricsSnapshot;

/// Revenue floor for the large-cap hypergrowth test.
const LARGE_CAP_REVENUE: f64 = 5_000_000_000.0;

/// Classify a company as mature or hypergrowth.
///
/// An explicit growth-model hint wins outright. Otherwise the call is made
/// from growth evidence: sustained 25%+ revenue growth at scale, 25%+ FCF
/// growth, or 30%+ revenue growth at any size. Everything else is treated
/// as mature, which is the safer projection.
pub fn classify_archetype(
    metrics: &FinancialMetricsSnapshot,
    fcf_cagr: Option<f64>,
) -> Archetype {
    let hint = metrics
        .growth_model
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    if hint.contains("high") || hint.contains("hyper") {
        return Archetype::Hypergrowth;
    }
    if hint.contains("mature") || hint.contains("stable") {
        return Archetype::Mature;
    }

    let revenue_cagr = metrics.revenue_cagr_5y.and_then(sanitize);
    let revenue_last = metrics.revenue_last.and_then(sanitize);

    if revenue_last.is_some_and(|r| r >= LARGE_CAP_REVENUE)
        && revenue_cagr.is_some_and(|g| g >= 0.25)
    {
        return Archetype::Hypergrowth;
    }
    if fcf_cagr.is_some_and(|g| g >= 0.25) {
        return Archetype::Hypergrowth;
    }
    if revenue_cagr.is_some_and(|g| g >= 0.30) {
        return Archetype::Hypergrowth;
    }
    Archetype::Mature
}
