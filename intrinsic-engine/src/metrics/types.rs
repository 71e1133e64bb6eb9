//! Wire types for normalized company metrics.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// A year label as it appears in upstream series: either a plain number or
/// free text such as `"2023-09-30"` / `"FY2023"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearLabel {
    Number(f64),
    Text(String),
}

impl YearLabel {
    /// Extract a calendar year: numbers truncate, text yields its first
    /// four-digit run.
    pub fn to_year(&self) -> Option<i32> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n as i32),
            Self::Number(_) => None,
            Self::Text(s) => YEAR_PATTERN
                .find(s)
                .and_then(|m| m.as_str().parse().ok()),
        }
    }

    /// Whether this label carries any information at all. Empty strings and
    /// zero stand in for "unlabelled" upstream.
    fn is_usable(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

/// One historical free-cash-flow observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FcfObservation {
    /// Period label as reported upstream.
    pub label: Option<YearLabel>,
    /// Explicit year, consulted when the label is unusable.
    pub year: Option<i32>,
    /// Free cash flow for the period.
    pub value: Option<f64>,
}

impl FcfObservation {
    /// Resolve the calendar year for this observation.
    ///
    /// A usable label wins even when it fails to parse; the explicit year
    /// only backs up absent or empty labels.
    pub fn resolved_year(&self) -> Option<i32> {
        match &self.label {
            Some(label) if label.is_usable() => label.to_year(),
            _ => self.year,
        }
    }
}

/// One historical return-on-invested-capital observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoicObservation {
    pub year: Option<i32>,
    pub roic: Option<f64>,
}

/// One historical net-operating-profit-after-tax observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NopatObservation {
    pub year: Option<i32>,
    pub nopat: Option<f64>,
}

/// Normalized historical metrics for one company.
///
/// Validated once at the boundary; every numeric field is optional and
/// absent/non-finite values are treated as missing throughout the engine.
/// Ordered lists are most-recent-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialMetricsSnapshot {
    /// Most recent annual revenue.
    pub revenue_last: Option<f64>,
    /// Trailing five-year revenue CAGR.
    #[serde(rename = "revenueCAGR5Y")]
    pub revenue_cagr_5y: Option<f64>,
    /// Most recent EBIT margin.
    pub ebit_margin_last: Option<f64>,
    /// EBIT margins, most recent first, up to five years.
    pub margin_history: Vec<f64>,
    /// Multi-year normalized effective tax rate.
    pub normalized_tax_rate: Option<f64>,
    /// Total debt minus cash.
    pub net_debt: Option<f64>,
    /// Diluted shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Calendar year of the most recent statements.
    pub base_year: Option<i32>,
    /// Caller-suggested forecast horizon in years.
    pub horizon_years: Option<f64>,
    /// Historical ROIC by year.
    pub roic_history: Vec<RoicObservation>,
    /// Historical NOPAT by year.
    pub nopat_history: Vec<NopatObservation>,
    /// Normalized base-year FCFF built up from the statements.
    pub base_year_fcff_normalized: Option<f64>,
    /// Latest reported free cash flow, fallback base candidate.
    pub base_fcf: Option<f64>,
    /// Historical free cash flow series, most recent first.
    pub fcf_series: Vec<FcfObservation>,
    /// Free-text growth profile hint, e.g. "High Growth".
    pub growth_model: Option<String>,
}

impl FinancialMetricsSnapshot {
    /// All finite historical FCF values, most recent first. Negative years
    /// are kept; downstream consumers decide how to treat them.
    pub fn fcf_values(&self) -> Vec<f64> {
        self.fcf_series
            .iter()
            .filter_map(|obs| obs.value)
            .filter(|v| v.is_finite())
            .collect()
    }
}
