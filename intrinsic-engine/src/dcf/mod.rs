//! Deterministic two-stage DCF valuation.
//!
//! The pipeline: normalize a base FCFF out of noisy history, classify the
//! company archetype, pick a scenario assumption bundle, build a growth
//! path, project and discount FCFF, and bridge enterprise value to an
//! implied share price. Companies classified as hypergrowth get a
//! revenue-times-margin projection instead of direct FCFF compounding.

pub mod archetype;
pub mod engine;
pub mod growth;
pub mod normalize;
pub mod projector;
pub mod scenario;
pub mod types;

pub use archetype::classify_archetype;
pub use engine::{DcfEngine, EngineConfig, ValuationRequest, ENGINE_VERSION};
pub use scenario::{scenario_config, ScenarioConfig};
pub use types::{
    Archetype, ForecastYear, ScenarioPreset, TerminalValueSummary, ValuationResult,
    ValuationSettings,
};
