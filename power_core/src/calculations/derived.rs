//! # Derived Binary Designs
//!
//! Case-control and cohort designs have no numeric method of their own: each
//! converts its target ratio into a pair of proportions and delegates to
//! [`two_proportions`].
//!
//! - Case-control: p1 = OR·p0 / (1 − p0 + OR·p0), arms = (cases, controls)
//! - Cohort: p1 = RR·p0, arms = (exposed/treated, unexposed/control)

use serde::{Deserialize, Serialize};

use crate::calculations::means::default_ratio;
use crate::calculations::proportions::{two_proportions, TwoProportionsInput};
use crate::calculations::PlanningResult;
use crate::derivations::{p1_from_or, p1_from_rr};
use crate::errors::PlanResult;
use crate::params::DesignParameters;
use crate::validation::{validate_positive, validate_proportion};

pub const CASE_CONTROL_OR: &str = "Case-control (odds ratio)";
pub const COHORT_RR: &str = "Cohort (risk ratio)";

/// Unmatched case-control study.
///
/// ## JSON Example
///
/// ```json
/// { "p0": 0.3, "odds_ratio": 2.0, "control_case_ratio": 1.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseControlInput {
    /// Exposure prevalence among controls
    pub p0: f64,
    /// Target odds ratio
    pub odds_ratio: f64,
    /// Controls per case
    #[serde(default = "default_ratio")]
    pub control_case_ratio: f64,
}

impl CaseControlInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_proportion(self.p0, "p0")?;
        validate_positive(self.odds_ratio, "odds_ratio")?;
        validate_positive(self.control_case_ratio, "control_case_ratio")?;
        Ok(())
    }

    /// The equivalent two-proportions specification
    pub fn to_two_proportions(&self) -> PlanResult<TwoProportionsInput> {
        self.validate()?;
        Ok(TwoProportionsInput {
            p1: p1_from_or(self.p0, self.odds_ratio)?,
            p2: self.p0,
            allocation_ratio: self.control_case_ratio,
        })
    }
}

/// Cohort study or RCT with a binary outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortInput {
    /// Risk in the unexposed/control group (p0)
    pub baseline_risk: f64,
    /// Target risk ratio
    pub risk_ratio: f64,
    /// Allocation ratio r = n₂ / n₁
    #[serde(default = "default_ratio")]
    pub allocation_ratio: f64,
}

impl CohortInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_proportion(self.baseline_risk, "baseline_risk")?;
        validate_positive(self.risk_ratio, "risk_ratio")?;
        validate_positive(self.allocation_ratio, "allocation_ratio")?;
        Ok(())
    }

    /// The equivalent two-proportions specification; fails if RR·p0 ≥ 1.
    pub fn to_two_proportions(&self) -> PlanResult<TwoProportionsInput> {
        self.validate()?;
        Ok(TwoProportionsInput {
            p1: p1_from_rr(self.baseline_risk, self.risk_ratio)?,
            p2: self.baseline_risk,
            allocation_ratio: self.allocation_ratio,
        })
    }
}

/// Case-control design; arm 1 is cases, arm 2 is controls.
pub fn case_control_or(params: &DesignParameters, input: &CaseControlInput) -> PlanResult<PlanningResult> {
    let reduced = input.to_two_proportions()?;
    Ok(two_proportions(params, &reduced)?.relabel(
        CASE_CONTROL_OR,
        "Derived p1 from OR and applied two-proportion normal approximation",
        "Unmatched case-control design",
    ))
}

/// Cohort design; arm 1 is exposed/treated, arm 2 is unexposed/control.
pub fn cohort_rr(params: &DesignParameters, input: &CohortInput) -> PlanResult<PlanningResult> {
    let reduced = input.to_two_proportions()?;
    Ok(two_proportions(params, &reduced)?.relabel(
        COHORT_RR,
        "Derived p1 = RR x p0 and applied two-proportion normal approximation",
        "Cohort or randomized controlled design",
    ))
}
