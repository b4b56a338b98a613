//! # Association Designs
//!
//! - Correlation against ρ = 0 via the Fisher z-transformation:
//!   `n = ((Zα + Zβ) / atanh(|r|))² + 3`
//! - Logistic regression by the events-per-variable rule:
//!   `events = EPV × predictors`, `n = events / event_rate`
//!
//! The EPV rule is a model-stability heuristic, so it ignores alpha, power
//! and sidedness; only dropout applies.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{CriticalValues, PlanningResult};
use crate::errors::{PlanError, PlanResult};
use crate::params::DesignParameters;
use crate::validation::{ceil_count, validate_count, validate_proportion};

pub const CORRELATION: &str = "Correlation";
pub const LOGISTIC_EPV: &str = "Logistic regression (EPV)";

/// Largest |r| accepted; the Fisher transform diverges at ±1.
pub const MAX_ABS_CORRELATION: f64 = 0.99;

/// Events per variable when the request does not specify one.
pub const DEFAULT_EPV: u32 = 10;

/// Expected correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationInput {
    pub r: f64,
}

impl CorrelationInput {
    pub fn validate(&self) -> PlanResult<()> {
        if !self.r.is_finite() {
            return Err(PlanError::out_of_range("r", self.r, "Correlation must be a finite number"));
        }
        if self.r == 0.0 {
            return Err(PlanError::arithmetic_domain("r", self.r, "Correlation must be non-zero"));
        }
        if self.r.abs() >= MAX_ABS_CORRELATION {
            return Err(PlanError::out_of_range(
                "r",
                self.r,
                format!("|r| must be below {}", MAX_ABS_CORRELATION),
            ));
        }
        Ok(())
    }
}

/// Event rate, number of predictors and the EPV target.
///
/// ## JSON Example
///
/// ```json
/// { "event_rate": 0.2, "predictors": 5, "epv": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticEpvInput {
    /// Expected proportion of participants with the outcome
    pub event_rate: f64,

    /// Candidate predictor parameters in the model
    pub predictors: u32,

    /// Events per variable; `None` uses the configured default
    #[serde(default)]
    pub epv: Option<u32>,
}

impl LogisticEpvInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_proportion(self.event_rate, "event_rate")?;
        validate_count(self.predictors, 1, "predictors")?;
        validate_count(self.effective_epv(), 1, "epv")?;
        Ok(())
    }

    pub fn effective_epv(&self) -> u32 {
        self.epv.unwrap_or(DEFAULT_EPV)
    }
}

/// Correlation test of H0: ρ = 0.
pub fn correlation(params: &DesignParameters, input: &CorrelationInput) -> PlanResult<PlanningResult> {
    input.validate()?;
    let z = CriticalValues::from_params(params)?;

    let fisher_z = input.r.abs().atanh();
    let n = ceil_count((z.sum() / fisher_z).powi(2) + 3.0, "n")?;
    debug!(n, r = input.r, fisher_z, "correlation");

    PlanningResult::single(
        CORRELATION,
        n,
        params.dropout_rate,
        "Fisher z-transformation method",
        &[
            "Bivariate normal distribution",
            "Testing H0: rho = 0",
            "Large sample approximation",
        ],
    )
}

/// Logistic regression sized by events per variable.
pub fn logistic_epv(params: &DesignParameters, input: &LogisticEpvInput) -> PlanResult<PlanningResult> {
    input.validate()?;
    params.validate()?;

    let events = u64::from(input.effective_epv()) * u64::from(input.predictors);
    let n = ceil_count(events as f64 / input.event_rate, "n")?;
    debug!(n, events, event_rate = input.event_rate, "logistic EPV");

    let mut result = PlanningResult::single(
        LOGISTIC_EPV,
        n,
        params.dropout_rate,
        "required_events = EPV x predictors; n = required_events / event_rate",
        &[
            "Logistic regression planning rule",
            "EPV ensures model stability",
            "Not a hypothesis-testing power calculation",
        ],
    )?;
    result.required_events = Some(events);
    Ok(result)
}
