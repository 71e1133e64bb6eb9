//! Cost-of-capital estimation.
//!
//! Beta transforms (Hamada unlever/relever plus shrinkage toward the market
//! average), CAPM cost of equity, observed-or-synthesized cost of debt, and
//! the WACC blend. Every output is clamped to a plausibility band so a bad
//! data point cannot produce an absurd discount rate.

pub mod calculator;
pub mod types;

pub use calculator::{
    CostOfCapitalCalculator, MarketAssumptions, BETA_MAX, BETA_MIN, MAX_COST_OF_DEBT,
    MIN_COST_OF_DEBT, WACC_MAX, WACC_MIN,
};
pub use types::{CapitalStructureInputs, CostOfCapitalSnapshot};
