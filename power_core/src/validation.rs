//! # Input Validation and Rounding
//!
//! Domain checks shared by every calculator, plus the two rounding steps that
//! turn a real-valued formula output into a head count:
//!
//! 1. [`ceil_count`] - ceiling of the raw formula output
//! 2. [`adjust_for_dropout`] - inflation for attrition, applied once, after step 1

use crate::errors::{PlanError, PlanResult};

/// Dropout rates at or above this are rejected
pub const MAX_DROPOUT_RATE: f64 = 0.95;

/// Require 0 < p < 1.
pub fn validate_proportion(p: f64, field: &str) -> PlanResult<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(PlanError::out_of_range(
            field,
            p,
            "Proportion must be between 0 and 1 (exclusive)",
        ));
    }
    Ok(p)
}

/// Require x > 0 (and finite).
pub fn validate_positive(x: f64, field: &str) -> PlanResult<f64> {
    if !(x > 0.0 && x.is_finite()) {
        return Err(PlanError::out_of_range(field, x, "Value must be positive"));
    }
    Ok(x)
}

/// Require a count of at least `min`.
pub fn validate_count(n: u32, min: u32, field: &str) -> PlanResult<u32> {
    if n < min {
        return Err(PlanError::out_of_range(field, n, format!("Must be at least {min}")));
    }
    Ok(n)
}

/// Require 0 ≤ dropout < 0.95.
pub fn validate_dropout(dropout_rate: f64) -> PlanResult<f64> {
    if dropout_rate.is_nan() || dropout_rate < 0.0 {
        return Err(PlanError::out_of_range(
            "dropout_rate",
            dropout_rate,
            "Dropout rate cannot be negative",
        ));
    }
    if dropout_rate >= MAX_DROPOUT_RATE {
        return Err(PlanError::dropout_too_high(dropout_rate));
    }
    Ok(dropout_rate)
}

/// Round a raw sample size up to the next whole participant.
pub fn ceil_count(raw: f64, field: &str) -> PlanResult<u64> {
    if !raw.is_finite() {
        return Err(PlanError::internal(format!("{field} evaluated to {raw}")));
    }
    if raw <= 0.0 {
        return Err(PlanError::internal(format!("{field} evaluated to non-positive {raw}")));
    }
    Ok(raw.ceil() as u64)
}

/// Inflate a (ceiled) sample size for expected attrition:
/// `ceil(n / (1 − dropout_rate))`.
///
/// # Example
///
/// ```rust
/// use power_core::validation::adjust_for_dropout;
///
/// assert_eq!(adjust_for_dropout(18, 0.10).unwrap(), 20);
/// assert_eq!(adjust_for_dropout(18, 0.0).unwrap(), 18);
/// assert!(adjust_for_dropout(18, 0.95).is_err());
/// ```
pub fn adjust_for_dropout(n: u64, dropout_rate: f64) -> PlanResult<u64> {
    let dropout_rate = validate_dropout(dropout_rate)?;
    if dropout_rate == 0.0 {
        return Ok(n);
    }
    let adjusted = (n as f64 / (1.0 - dropout_rate)).ceil() as u64;
    Ok(adjusted.max(n))
}
