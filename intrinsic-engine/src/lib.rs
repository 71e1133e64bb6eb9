//! Intrinsic Engine - deterministic DCF valuation for public companies.
//!
//! This crate provides:
//! - Statement-derived financial metrics ([`metrics`])
//! - CAPM cost of capital with Hamada releveraging ([`cost_of_capital`])
//! - A scenario-driven two-stage DCF engine ([`dcf`])
//!
//! The same request always produces the same valuation: there is no
//! randomness, no clock and no network anywhere in the pipeline. The
//! `intrinsic` binary wraps the pipeline behind a JSON-in/JSON-out CLI.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod cost_of_capital;
pub mod dcf;
pub mod metrics;

pub use cost_of_capital::{
    CapitalStructureInputs, CostOfCapitalCalculator, CostOfCapitalSnapshot, MarketAssumptions,
};
pub use dcf::{DcfEngine, EngineConfig, ValuationRequest, ValuationResult};
pub use metrics::{FinancialMetricsSnapshot, StatementHistory, StatementYear};
