//! Financial metrics: snapshot types and statement-derived assembly.

pub mod statements;
pub mod types;

pub use statements::{growth_model_label, StatementHistory, StatementYear};
pub use types::{
    FcfObservation, FinancialMetricsSnapshot, NopatObservation, RoicObservation, YearLabel,
};
