//! Intrinsic Common - Shared primitives for the Intrinsic valuation engine.
//!
//! This crate provides:
//! - Error types with stable machine-readable codes
//! - Logging setup (structured JSON or pretty ANSI, always on stderr)
//! - Numeric guardrails (clamping, sanitization, robust statistics)

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod error;
pub mod logging;
pub mod numeric;

pub use error::{Error, ErrorPayload, Result, ResultExt};

/// Re-export commonly used items for convenience
pub mod prelude {
    pub use crate::error::{Error, ErrorPayload, Result, ResultExt};
    pub use crate::logging::init_logging;
    pub use crate::numeric::{clamp, safe_f64, sanitize};
}
