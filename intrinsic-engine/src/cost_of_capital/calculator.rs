//! Cost-of-capital calculator: beta transforms, CAPM, cost of debt, WACC.

use intrinsic_common::numeric::{clamp, safe_f64};
use serde::{Deserialize, Serialize};

use super::types::{CapitalStructureInputs, CostOfCapitalSnapshot};

/// Beta is never allowed outside this band, whatever the data says.
pub const BETA_MIN: f64 = 0.5;
pub const BETA_MAX: f64 = 2.0;

/// Cost-of-debt band; covers investment grade through deep junk.
pub const MIN_COST_OF_DEBT: f64 = 0.02;
pub const MAX_COST_OF_DEBT: f64 = 0.15;

/// Global WACC band applied after any scenario-level adjustment.
pub const WACC_MIN: f64 = 0.06;
pub const WACC_MAX: f64 = 0.11;

// ===== Market Assumptions =====

fn default_risk_free_rate() -> f64 {
    0.0325
}

fn default_market_risk_premium() -> f64 {
    0.0475
}

fn default_beta_shrinkage() -> f64 {
    0.67
}

fn default_tax_rate() -> f64 {
    0.21
}

/// Normalized market assumptions feeding CAPM and the debt spread.
///
/// Deliberately cycle-smoothed values rather than spot market rates, so
/// valuations stay comparable across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketAssumptions {
    /// Normalized risk-free rate.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Normalized equity market risk premium.
    #[serde(default = "default_market_risk_premium")]
    pub market_risk_premium: f64,
    /// Weight on the observed beta when shrinking toward 1.0.
    #[serde(default = "default_beta_shrinkage")]
    pub beta_shrinkage: f64,
    /// Tax rate assumed when none is supplied.
    #[serde(default = "default_tax_rate")]
    pub default_tax_rate: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            market_risk_premium: default_market_risk_premium(),
            beta_shrinkage: default_beta_shrinkage(),
            default_tax_rate: default_tax_rate(),
        }
    }
}

// ===== Calculator =====

/// Cost-of-capital calculator.
///
/// All methods are pure; missing or non-finite inputs degrade to
/// conservative defaults instead of failing.
#[derive(Debug, Clone)]
pub struct CostOfCapitalCalculator {
    assumptions: MarketAssumptions,
}

impl CostOfCapitalCalculator {
    /// Create a calculator with default market assumptions.
    pub fn new() -> Self {
        Self {
            assumptions: MarketAssumptions::default(),
        }
    }

    /// Create a calculator with custom market assumptions.
    pub fn with_assumptions(assumptions: MarketAssumptions) -> Self {
        Self { assumptions }
    }

    /// The active market assumptions.
    pub fn assumptions(&self) -> &MarketAssumptions {
        &self.assumptions
    }

    /// Convert an observed beta to an asset (unlevered) beta via Hamada's
    /// equation: `beta / (1 + D/E * (1 - tax))`.
    pub fn unlever_beta(
        &self,
        beta_levered: Option<f64>,
        debt_equity: Option<f64>,
        tax_rate: Option<f64>,
    ) -> f64 {
        let beta = clamp(beta_levered.or(Some(1.0)), BETA_MIN, BETA_MAX);
        let de_ratio = debt_equity.unwrap_or(0.0).max(0.0);
        let tax = clamp(
            tax_rate.or(Some(self.assumptions.default_tax_rate)),
            0.0,
            0.5,
        );
        let denominator = 1.0 + de_ratio * (1.0 - tax);
        if denominator <= 0.0 {
            return beta;
        }
        clamp(Some(beta / denominator), BETA_MIN, BETA_MAX)
    }

    /// Re-lever an asset beta to a target capital structure:
    /// `beta * (1 + D/E * (1 - tax))`.
    pub fn relever_beta(
        &self,
        beta_unlevered: Option<f64>,
        target_debt_equity: Option<f64>,
        tax_rate: Option<f64>,
    ) -> f64 {
        let beta = clamp(beta_unlevered.or(Some(1.0)), BETA_MIN, BETA_MAX);
        let de_ratio = target_debt_equity.unwrap_or(0.0).max(0.0);
        let tax = clamp(
            tax_rate.or(Some(self.assumptions.default_tax_rate)),
            0.0,
            0.5,
        );
        let relevered = beta * (1.0 + de_ratio * (1.0 - tax));
        clamp(Some(relevered), BETA_MIN, BETA_MAX)
    }

    /// Blend the observed beta toward 1.0 to temper extreme inputs.
    pub fn shrink_beta(&self, beta_raw: Option<f64>) -> f64 {
        let beta = safe_f64(beta_raw, 1.0);
        let weight = self.assumptions.beta_shrinkage;
        let shrunk = weight * beta + (1.0 - weight) * 1.0;
        clamp(Some(shrunk), BETA_MIN, BETA_MAX)
    }

    /// Standard CAPM cost of equity: `rf + beta * premium`.
    pub fn cost_of_equity(&self, beta: f64, risk_free_rate: f64, market_risk_premium: f64) -> f64 {
        let beta_safe = clamp(Some(beta), BETA_MIN, BETA_MAX);
        risk_free_rate + beta_safe * market_risk_premium
    }

    /// Estimate the marginal cost of debt.
    ///
    /// Prefers the observed yield `|interest| / total_debt`; otherwise
    /// synthesizes risk-free plus a spread from interest coverage, adjusted
    /// by the leverage ratio. Output is always within
    /// [`MIN_COST_OF_DEBT`, `MAX_COST_OF_DEBT`].
    pub fn cost_of_debt(
        &self,
        interest_expense: Option<f64>,
        total_debt: Option<f64>,
        risk_free_rate: f64,
        ebit: Option<f64>,
        leverage_ratio: Option<f64>,
    ) -> f64 {
        let mut cost = None;
        if let (Some(debt), Some(interest)) = (total_debt, interest_expense) {
            if debt > 0.0 && interest.abs() > 0.0 {
                cost = Some(interest.abs() / debt);
            }
        }

        let mut coverage = None;
        if let (Some(interest), Some(ebit)) = (interest_expense, ebit) {
            if interest != 0.0 && interest.abs() > 0.0 {
                coverage = Some(ebit / interest.abs());
            }
        }

        let observed_usable = matches!(cost, Some(c) if c.is_finite() && c > 0.0);
        if !observed_usable {
            let mut spread = spread_from_coverage(coverage);
            if let Some(leverage) = leverage_ratio {
                if leverage >= 0.0 {
                    if leverage < 0.2 {
                        spread = spread.min(0.01);
                    } else if leverage < 0.4 {
                        spread = spread.max(0.015);
                    } else if leverage < 0.7 {
                        spread = spread.max(0.02);
                    } else {
                        spread = spread.max(0.03);
                    }
                }
            }
            cost = Some(risk_free_rate + spread);
        }

        clamp(cost, MIN_COST_OF_DEBT, MAX_COST_OF_DEBT)
    }

    /// Blend cost-of-capital components into a WACC within `[min, max]`.
    ///
    /// The equity weight is clamped to [0.70, 0.98] regardless of the true
    /// capital structure; a zero total value degrades to the cost of equity.
    pub fn wacc(
        &self,
        cost_of_equity: f64,
        cost_of_debt_after_tax: f64,
        equity_value: Option<f64>,
        debt_value: Option<f64>,
        min_wacc: f64,
        max_wacc: f64,
    ) -> f64 {
        let equity = equity_value.unwrap_or(0.0).max(0.0);
        let debt = debt_value.unwrap_or(0.0).max(0.0);
        let total = equity + debt;

        let raw = if total == 0.0 {
            cost_of_equity
        } else {
            let equity_weight = clamp(Some(equity / total), 0.70, 0.98);
            let debt_weight = 1.0 - equity_weight;
            equity_weight * cost_of_equity + debt_weight * cost_of_debt_after_tax
        };

        clamp(Some(raw), min_wacc, max_wacc)
    }

    /// Assemble the full snapshot from raw market inputs.
    ///
    /// Runs the whole chain: D/E resolution, beta unlever/relever/shrink,
    /// CAPM, cost of debt, weight echo, WACC blend.
    pub fn build_snapshot(&self, inputs: &CapitalStructureInputs) -> CostOfCapitalSnapshot {
        let market_cap = safe_f64(inputs.market_cap, 0.0);
        let total_debt = safe_f64(inputs.total_debt, 0.0);
        let interest_expense = safe_f64(inputs.interest_expense, 0.0);
        let tax_rate = safe_f64(inputs.tax_rate, self.assumptions.default_tax_rate);

        let debt_equity_ratio = if market_cap > 0.0 {
            total_debt / market_cap
        } else if total_debt > 0.0 {
            // Debt outstanding but no observable equity value: treat as
            // heavily levered.
            5.0
        } else {
            0.0
        };

        let beta_unlevered =
            self.unlever_beta(inputs.beta_raw, Some(debt_equity_ratio), Some(tax_rate));
        let beta_relevered = self.relever_beta(
            Some(beta_unlevered),
            Some(debt_equity_ratio),
            Some(tax_rate),
        );
        let beta_adjusted = self.shrink_beta(Some(beta_relevered));

        let cost_of_equity = self.cost_of_equity(
            beta_adjusted,
            self.assumptions.risk_free_rate,
            self.assumptions.market_risk_premium,
        );
        let cost_of_debt = self.cost_of_debt(
            Some(interest_expense),
            Some(total_debt),
            self.assumptions.risk_free_rate,
            inputs.ebit,
            Some(debt_equity_ratio),
        );
        let cost_of_debt_after_tax = cost_of_debt * (1.0 - tax_rate);

        let total_value = market_cap + total_debt;
        let equity_weight = if total_value > 0.0 {
            market_cap / total_value
        } else {
            1.0
        };
        let equity_weight = clamp(Some(equity_weight), 0.70, 0.98);
        let debt_weight = 1.0 - equity_weight;

        let wacc = self.wacc(
            cost_of_equity,
            cost_of_debt_after_tax,
            Some(market_cap),
            Some(total_debt),
            WACC_MIN,
            WACC_MAX,
        );

        CostOfCapitalSnapshot {
            wacc: Some(wacc),
            risk_free_rate: Some(self.assumptions.risk_free_rate),
            market_risk_premium: Some(self.assumptions.market_risk_premium),
            beta_raw: Some(safe_f64(inputs.beta_raw, 1.0)),
            beta_unlevered: Some(beta_unlevered),
            beta_relevered: Some(beta_relevered),
            beta_adjusted: Some(beta_adjusted),
            cost_of_equity: Some(cost_of_equity),
            cost_of_debt: Some(cost_of_debt),
            cost_of_debt_pre_tax: Some(cost_of_debt),
            cost_of_debt_after_tax: Some(cost_of_debt_after_tax),
            equity_weight: Some(equity_weight),
            debt_weight: Some(debt_weight),
        }
    }
}

impl Default for CostOfCapitalCalculator {
    fn default() -> Self {
        Self::new()
    }
}

// ===== Helper Functions =====

/// Map an interest-coverage ratio to a credit spread.
fn spread_from_coverage(coverage: Option<f64>) -> f64 {
    match coverage {
        Some(c) if c.is_finite() && c > 0.0 => {
            if c >= 8.0 {
                0.01
            } else if c >= 5.0 {
                0.0125
            } else if c >= 3.0 {
                0.0175
            } else if c >= 1.5 {
                0.025
            } else {
                0.035
            }
        }
        _ => 0.03,
    }
}
