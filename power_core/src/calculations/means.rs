//! # Mean Comparisons
//!
//! Z-based sample sizes for continuous outcomes:
//!
//! ```text
//! one-sample / paired:  n  = ((Zα + Zβ) · SD / Δ)²
//! two independent:      n₁ = (1 + 1/r) · ((Zα + Zβ) · SD / Δ)²,  n₂ = r · n₁
//! ```
//!
//! For the paired design, SD is the SD of within-subject differences
//! (see [`crate::derivations::sd_of_differences`]).
//!
//! ## Example
//!
//! ```rust
//! use power_core::DesignParameters;
//! use power_core::calculations::means::{one_sample_mean, MeanInput};
//!
//! let params = DesignParameters::new(0.05, 0.80).with_dropout(0.10);
//! let result = one_sample_mean(&params, &MeanInput { sd: 15.0, delta: 10.0 }).unwrap();
//! assert_eq!(result.n_before_dropout, 18);
//! assert_eq!(result.n_required, 20);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{CriticalValues, PlanningResult};
use crate::errors::PlanResult;
use crate::params::DesignParameters;
use crate::validation::{ceil_count, validate_positive};

pub const ONE_SAMPLE_MEAN: &str = "One-sample mean";
pub const PAIRED_MEAN: &str = "Paired mean";
pub const TWO_INDEPENDENT_MEANS: &str = "Two independent means";

/// SD and detectable difference for a one-group (or paired) mean test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanInput {
    /// Standard deviation (SD of differences for paired designs)
    pub sd: f64,

    /// Clinically meaningful difference Δ
    pub delta: f64,
}

impl MeanInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_positive(self.sd, "sd")?;
        validate_positive(self.delta, "delta")?;
        Ok(())
    }
}

/// Common SD, difference and allocation ratio for two independent groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoMeansInput {
    /// Common (pooled) standard deviation
    pub sd: f64,

    /// Expected mean difference Δ
    pub delta: f64,

    /// Allocation ratio r = n₂ / n₁
    #[serde(default = "default_ratio")]
    pub allocation_ratio: f64,
}

pub(crate) fn default_ratio() -> f64 {
    1.0
}

impl TwoMeansInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_positive(self.sd, "sd")?;
        validate_positive(self.delta, "delta")?;
        validate_positive(self.allocation_ratio, "allocation_ratio")?;
        Ok(())
    }
}

fn single_mean_n(params: &DesignParameters, input: &MeanInput) -> PlanResult<u64> {
    input.validate()?;
    let z = CriticalValues::from_params(params)?;
    let n_raw = (z.sum() * input.sd / input.delta).powi(2);
    ceil_count(n_raw, "n")
}

/// One-sample mean test.
pub fn one_sample_mean(params: &DesignParameters, input: &MeanInput) -> PlanResult<PlanningResult> {
    let n = single_mean_n(params, input)?;
    debug!(n, sd = input.sd, delta = input.delta, "one-sample mean");
    PlanningResult::single(
        ONE_SAMPLE_MEAN,
        n,
        params.dropout_rate,
        "n = ((Z_alpha + Z_beta) * sd / delta)^2",
        &[
            "Outcome approximately normally distributed",
            "Known or estimated SD from literature or pilot",
            "Two-sided or one-sided test specified",
        ],
    )
}

/// Paired mean difference; `input.sd` is the SD of the differences.
pub fn paired_mean(params: &DesignParameters, input: &MeanInput) -> PlanResult<PlanningResult> {
    let n = single_mean_n(params, input)?;
    debug!(n, sd_diff = input.sd, delta = input.delta, "paired mean");
    PlanningResult::single(
        PAIRED_MEAN,
        n,
        params.dropout_rate,
        "n = ((Z_alpha + Z_beta) * sd_diff / delta)^2",
        &[
            "Paired or repeated measurements",
            "Differences approximately normally distributed",
            "SD is SD of differences (not raw SD)",
        ],
    )
}

/// Two independent means with allocation ratio r = n₂ / n₁.
pub fn two_independent_means(params: &DesignParameters, input: &TwoMeansInput) -> PlanResult<PlanningResult> {
    input.validate()?;
    let z = CriticalValues::from_params(params)?;
    let r = input.allocation_ratio;

    let n1_raw = (1.0 + 1.0 / r) * (z.sum() * input.sd / input.delta).powi(2);
    let n1 = ceil_count(n1_raw, "n1")?;
    let n2 = ceil_count(r * n1_raw, "n2")?;
    debug!(n1, n2, r, "two independent means");

    PlanningResult::two_arm(
        TWO_INDEPENDENT_MEANS,
        n1,
        n2,
        params.dropout_rate,
        "n1 = (1 + 1/r) * ((Z_alpha + Z_beta) * sd / delta)^2, n2 = r * n1",
        &[
            "Independent groups",
            "Common SD (pooled estimate)",
            "Normal approximation",
            "Allocation ratio specified",
        ],
    )
}
