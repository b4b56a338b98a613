//! # Design Parameters
//!
//! The error-rate settings shared by every calculator. Each calculation
//! receives its own copy; nothing here is cached between calls.

use serde::{Deserialize, Serialize};

use crate::errors::{PlanError, PlanResult};
use crate::validation::validate_dropout;

/// Largest accepted type I error rate
pub const MAX_ALPHA: f64 = 0.2;
/// Smallest accepted target power
pub const MIN_POWER: f64 = 0.5;
/// Largest accepted target power
pub const MAX_POWER: f64 = 0.99;

/// Significance, power, sidedness and attrition for one calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "alpha": 0.05,
///   "power": 0.8,
///   "two_sided": true,
///   "dropout_rate": 0.1
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignParameters {
    /// Type I error rate, in (0, 0.2]
    pub alpha: f64,

    /// Target power 1 − β, in [0.5, 0.99]
    pub power: f64,

    /// Two-sided test (ignored by F-test designs and the EPV rule)
    #[serde(default = "default_two_sided")]
    pub two_sided: bool,

    /// Expected attrition fraction, in [0, 0.95)
    #[serde(default)]
    pub dropout_rate: f64,
}

fn default_two_sided() -> bool {
    true
}

impl Default for DesignParameters {
    fn default() -> Self {
        DesignParameters {
            alpha: 0.05,
            power: 0.80,
            two_sided: true,
            dropout_rate: 0.0,
        }
    }
}

impl DesignParameters {
    /// Create parameters for a two-sided test with no dropout.
    pub fn new(alpha: f64, power: f64) -> Self {
        DesignParameters {
            alpha,
            power,
            ..Default::default()
        }
    }

    /// Builder: set sidedness
    pub fn with_two_sided(mut self, two_sided: bool) -> Self {
        self.two_sided = two_sided;
        self
    }

    /// Builder: set the expected dropout rate
    pub fn with_dropout(mut self, dropout_rate: f64) -> Self {
        self.dropout_rate = dropout_rate;
        self
    }

    /// Validate all fields. Dropout at or above 0.95 yields `DropoutTooHigh`.
    pub fn validate(&self) -> PlanResult<()> {
        if !(self.alpha > 0.0 && self.alpha <= MAX_ALPHA) {
            return Err(PlanError::out_of_range(
                "alpha",
                self.alpha,
                format!("Alpha must be in (0, {MAX_ALPHA}]"),
            ));
        }
        if !(MIN_POWER..=MAX_POWER).contains(&self.power) {
            return Err(PlanError::out_of_range(
                "power",
                self.power,
                format!("Power must be in [{MIN_POWER}, {MAX_POWER}]"),
            ));
        }
        validate_dropout(self.dropout_rate)?;
        Ok(())
    }

    /// "two-sided" / "one-sided"
    pub fn sidedness_label(&self) -> &'static str {
        if self.two_sided {
            "two-sided"
        } else {
            "one-sided"
        }
    }
}
