//! Wire types for the cost-of-capital module.

use serde::{Deserialize, Serialize};

/// Fully resolved cost-of-capital snapshot.
///
/// Every field is optional on the wire; absent means the value could not be
/// derived from the available inputs. `costOfDebt` and `costOfDebtPreTax`
/// carry the same pre-tax figure (the duplicate key is part of the
/// published contract).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostOfCapitalSnapshot {
    /// Blended weighted average cost of capital.
    pub wacc: Option<f64>,
    /// Normalized risk-free rate used throughout.
    pub risk_free_rate: Option<f64>,
    /// Normalized equity market risk premium.
    pub market_risk_premium: Option<f64>,
    /// Observed (levered) beta, echoed as supplied.
    pub beta_raw: Option<f64>,
    /// Asset beta after stripping financing leverage.
    pub beta_unlevered: Option<f64>,
    /// Beta re-levered to the company's capital structure.
    pub beta_relevered: Option<f64>,
    /// Relevered beta shrunk toward the market average.
    pub beta_adjusted: Option<f64>,
    /// CAPM cost of equity from the adjusted beta.
    pub cost_of_equity: Option<f64>,
    /// Pre-tax cost of debt.
    pub cost_of_debt: Option<f64>,
    /// Pre-tax cost of debt (duplicate of `costOfDebt`).
    pub cost_of_debt_pre_tax: Option<f64>,
    /// Cost of debt after the tax shield.
    pub cost_of_debt_after_tax: Option<f64>,
    /// Equity weight used in the blend, clamped to [0.70, 0.98].
    pub equity_weight: Option<f64>,
    /// Debt weight, complement of the equity weight.
    pub debt_weight: Option<f64>,
}

/// Raw market inputs for assembling a [`CostOfCapitalSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapitalStructureInputs {
    /// Observed levered beta.
    pub beta_raw: Option<f64>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Total interest-bearing debt.
    pub total_debt: Option<f64>,
    /// Latest annual interest expense.
    pub interest_expense: Option<f64>,
    /// Latest annual EBIT, for interest-coverage spreads.
    pub ebit: Option<f64>,
    /// Normalized effective tax rate.
    pub tax_rate: Option<f64>,
}
