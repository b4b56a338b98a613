//! # Survival (Log-Rank)
//!
//! Freedman's events formula for comparing two survival curves:
//!
//! ```text
//! p1 = 1 / (1 + r),  p2 = r / (1 + r)
//! D  = (Zα + Zβ)² / (ln(HR)² · p1 · p2)
//! N  = D / event_fraction
//! ```
//!
//! D and N are ceiled in turn, N is inflated for dropout, and the inflated
//! total is split into arms by ceiling N·p1 and N·p2. The arm sizes can
//! therefore sum to one more than the inflated total.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::means::default_ratio;
use crate::calculations::{CriticalValues, GroupBreakdown, PlanningResult};
use crate::errors::{PlanError, PlanResult};
use crate::params::DesignParameters;
use crate::validation::{adjust_for_dropout, ceil_count, validate_positive, validate_proportion};

pub const LOGRANK: &str = "Survival (log-rank)";

fn default_event_fraction() -> f64 {
    0.5
}

/// Hazard ratio, allocation and expected event fraction.
///
/// ## JSON Example
///
/// ```json
/// { "hazard_ratio": 0.7, "allocation_ratio": 1.0, "event_fraction": 0.5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogrankInput {
    /// Target hazard ratio (group 2 vs group 1)
    pub hazard_ratio: f64,

    /// Allocation ratio r = n₂ / n₁
    #[serde(default = "default_ratio")]
    pub allocation_ratio: f64,

    /// Fraction of participants expected to have the event during follow-up
    #[serde(default = "default_event_fraction")]
    pub event_fraction: f64,
}

impl LogrankInput {
    pub fn validate(&self) -> PlanResult<()> {
        if !(self.hazard_ratio > 0.0) {
            return Err(PlanError::arithmetic_domain(
                "hazard_ratio",
                self.hazard_ratio,
                "Hazard ratio must be positive to take its logarithm",
            ));
        }
        if self.hazard_ratio == 1.0 {
            return Err(PlanError::arithmetic_domain(
                "hazard_ratio",
                self.hazard_ratio,
                "Hazard ratio of 1 means no effect to detect",
            ));
        }
        validate_positive(self.allocation_ratio, "allocation_ratio")?;
        validate_proportion(self.event_fraction, "event_fraction")?;
        Ok(())
    }

    /// Allocation fractions (p1, p2)
    pub fn allocation_fractions(&self) -> (f64, f64) {
        let r = self.allocation_ratio;
        (1.0 / (1.0 + r), r / (1.0 + r))
    }
}

/// Required events and enrollment for a log-rank comparison.
pub fn logrank(params: &DesignParameters, input: &LogrankInput) -> PlanResult<PlanningResult> {
    input.validate()?;
    let z = CriticalValues::from_params(params)?;
    let (p1, p2) = input.allocation_fractions();

    let log_hr = input.hazard_ratio.ln();
    let events = ceil_count(z.sum().powi(2) / (log_hr.powi(2) * p1 * p2), "required_events")?;
    let n_total = ceil_count(events as f64 / input.event_fraction, "n")?;
    let n_enrolled = adjust_for_dropout(n_total, params.dropout_rate)?;

    let n1 = ceil_count(n_enrolled as f64 * p1, "n1")?;
    let n2 = ceil_count(n_enrolled as f64 * p2, "n2")?;
    let n1_before_dropout = ceil_count(n_total as f64 * p1, "n1")?;
    let n2_before_dropout = ceil_count(n_total as f64 * p2, "n2")?;
    debug!(events, n_total, n1, n2, hazard_ratio = input.hazard_ratio, "log-rank");

    // totals are reported as arm sums, which can exceed the unsplit N by one per arm
    Ok(PlanningResult {
        design: LOGRANK.to_string(),
        n_required: n1 + n2,
        n_before_dropout: n1_before_dropout + n2_before_dropout,
        groups: GroupBreakdown::TwoArm {
            n1,
            n2,
            n1_before_dropout,
            n2_before_dropout,
        },
        required_events: Some(events),
        f_test: None,
        formula: "Freedman log-rank events-based formula".to_string(),
        assumptions: vec![
            "Proportional hazards".to_string(),
            "Log-rank test".to_string(),
            "Event fraction estimate is accurate".to_string(),
        ],
    })
}
