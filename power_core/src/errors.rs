//! # Error Types
//!
//! Structured error types for power_core. Every calculator validates its
//! inputs before doing any arithmetic and fails with one of these variants,
//! never with a partially filled result.
//!
//! ## Example
//!
//! ```rust
//! use power_core::errors::{PlanError, PlanResult};
//!
//! fn validate_sd(sd: f64) -> PlanResult<()> {
//!     if sd <= 0.0 {
//!         return Err(PlanError::out_of_range("sd", sd, "SD must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_sd(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for power_core operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Structured error type for planning calculations.
///
/// Errors are terminal for the call that produced them but carry no state,
/// so the next calculation is unaffected.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum PlanError {
    /// A probability or effect size lies outside its valid domain
    #[error("Out of range for '{field}': {value} - {reason}")]
    OutOfRange {
        field: String,
        value: String,
        reason: String,
    },

    /// The formula is undefined for this input (log of a non-positive ratio,
    /// zero effect difference, empty table cell)
    #[error("Arithmetic domain error for '{field}': {value} - {reason}")]
    ArithmeticDomain {
        field: String,
        value: String,
        reason: String,
    },

    /// Dropout rate at or above the 0.95 ceiling
    #[error("Dropout rate too high: {dropout_rate} (must be below 0.95)")]
    DropoutTooHigh { dropout_rate: f64 },

    /// The noncentral-F search hit its probe cap without meeting the target power
    #[error("No convergence for {design} after {probes} probes - {reason}")]
    Convergence {
        design: String,
        probes: u32,
        reason: String,
    },

    /// A request or settings document is not valid JSON for its schema
    #[error("Invalid {document} document: {reason}")]
    InvalidDocument { document: String, reason: String },

    /// A numeric primitive produced a non-finite value (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlanError {
    /// Create an OutOfRange error
    pub fn out_of_range(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        PlanError::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an ArithmeticDomain error
    pub fn arithmetic_domain(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        PlanError::ArithmeticDomain {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a DropoutTooHigh error
    pub fn dropout_too_high(dropout_rate: f64) -> Self {
        PlanError::DropoutTooHigh { dropout_rate }
    }

    /// Create a Convergence error
    pub fn convergence(design: impl Into<String>, probes: u32, reason: impl Into<String>) -> Self {
        PlanError::Convergence {
            design: design.into(),
            probes,
            reason: reason.into(),
        }
    }

    /// Create an InvalidDocument error
    pub fn invalid_document(document: impl Into<String>, reason: impl ToString) -> Self {
        PlanError::InvalidDocument {
            document: document.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PlanError::Internal {
            message: message.into(),
        }
    }

    /// Name of the offending input field, when the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            PlanError::OutOfRange { field, .. } | PlanError::ArithmeticDomain { field, .. } => Some(field),
            PlanError::DropoutTooHigh { .. } => Some("dropout_rate"),
            PlanError::Convergence { .. } | PlanError::InvalidDocument { .. } | PlanError::Internal { .. } => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            PlanError::OutOfRange { .. } => "OUT_OF_RANGE",
            PlanError::ArithmeticDomain { .. } => "ARITHMETIC_DOMAIN",
            PlanError::DropoutTooHigh { .. } => "DROPOUT_TOO_HIGH",
            PlanError::Convergence { .. } => "CONVERGENCE",
            PlanError::InvalidDocument { .. } => "INVALID_DOCUMENT",
            PlanError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
