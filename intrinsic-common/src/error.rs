//! Error types for the Intrinsic valuation engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the Intrinsic error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the valuation engine.
///
/// Only [`Error::NoBaseCashFlow`] aborts a valuation; every other numeric
/// edge case is defused inside the engine through clamping or default
/// substitution. The remaining variants cover the boundary (payload parsing,
/// file IO in the CLI).
#[derive(Error, Debug)]
pub enum Error {
    /// No usable base free cash flow could be produced from history or a
    /// supplied candidate. The one fatal valuation error.
    #[error("No usable base FCFF: {0}")]
    NoBaseCashFlow(String),

    /// Invalid input or request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Structured failure body returned to callers instead of a raw error chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    /// Stable machine-readable code, e.g. `no_base_fcf`.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this is the fatal no-base-data error.
    pub const fn is_no_base_data(&self) -> bool {
        match self {
            Self::NoBaseCashFlow(_) => true,
            Self::WithContext { source, .. } => source.is_no_base_data(),
            _ => false,
        }
    }

    /// Check if this is an unexpected internal failure.
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::WithContext { source, .. } => source.is_internal(),
            _ => false,
        }
    }

    /// Get the stable string code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoBaseCashFlow(_) => "no_base_fcf",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config_error",
            Self::Internal(_) => "valuation_failed",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::WithContext { source, .. } => source.code(),
        }
    }

    /// Build the user-visible payload for this error.
    ///
    /// The fatal and internal codes carry fixed messages; internal detail
    /// stays in the logs, not in the payload.
    pub fn to_payload(&self) -> ErrorPayload {
        let message = if self.is_no_base_data() {
            "No usable free cash flow available for this valuation.".to_string()
        } else if self.is_internal() {
            "DCF could not be computed for this input.".to_string()
        } else {
            self.to_string()
        };
        ErrorPayload {
            error: self.code().to_string(),
            message,
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
