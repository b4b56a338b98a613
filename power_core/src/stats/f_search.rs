//! # Minimal-N Search over Noncentral-F Power
//!
//! Shared by one-way ANOVA (u = k − 1, λ = f²·N) and multiple linear
//! regression (u = predictors, λ = f²·N). For a total sample size N:
//!
//! ```text
//! v      = N − u − 1                  (denominator df, v ≥ 1)
//! λ      = f² · N
//! F_crit = F⁻¹(1 − α; u, v)
//! power  = 1 − F_ncf(F_crit; u, v, λ)
//! ```
//!
//! Power is non-decreasing in N for fixed u, α, f², so the search doubles v
//! from 1 until the target is met and then bisects the last bracket down to
//! the smallest integer v that meets it. Every power evaluation counts as a
//! probe; exceeding `max_probes` fails with [`PlanError::Convergence`].
//!
//! The F test is upper-tailed by construction, so sidedness never enters.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::errors::{PlanError, PlanResult};
use crate::stats::noncentral_f::{noncentral_f_power, FTestPower};

/// Default probe budget for a single search
pub const DEFAULT_MAX_PROBES: u32 = 10_000;

/// Largest denominator df the bracket may grow to
pub const MAX_DENOMINATOR_DF: u64 = 1_000_000;

/// Inputs to the minimal-N search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FSearchInput {
    /// Design name, used in error messages and logs
    pub design: String,
    /// Type I error rate
    pub alpha: f64,
    /// Target power
    pub target_power: f64,
    /// Squared effect size (Cohen's f², or f·f for ANOVA)
    pub effect_f2: f64,
    /// Numerator degrees of freedom u
    pub numerator_df: u32,
    /// Probe budget
    pub max_probes: u32,
}

/// The minimal total N together with the test characteristics at that N.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FTestSolution {
    /// Smallest total N whose power meets the target
    pub total_n: u64,
    /// Test characteristics at `total_n`
    pub power: FTestPower,
    /// Number of power evaluations spent
    pub probes: u32,
}

impl FSearchInput {
    fn validate(&self) -> PlanResult<()> {
        if self.numerator_df < 1 {
            return Err(PlanError::out_of_range(
                "numerator_df",
                self.numerator_df,
                "At least one numerator degree of freedom is required",
            ));
        }
        if !(self.effect_f2 > 0.0 && self.effect_f2.is_finite()) {
            return Err(PlanError::out_of_range("effect_f2", self.effect_f2, "Effect size must be positive"));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(PlanError::out_of_range("alpha", self.alpha, "Alpha must be between 0 and 1"));
        }
        if !(self.target_power > 0.0 && self.target_power < 1.0) {
            return Err(PlanError::out_of_range(
                "power",
                self.target_power,
                "Power must be between 0 and 1",
            ));
        }
        if self.max_probes < 1 {
            return Err(PlanError::out_of_range("max_probes", self.max_probes, "Probe budget must be positive"));
        }
        Ok(())
    }

    fn total_n_for(&self, v: u64) -> u64 {
        v + u64::from(self.numerator_df) + 1
    }
}

/// Power of the F test at a given total sample size.
///
/// Fails with `OutOfRange` when N leaves fewer than one denominator degree
/// of freedom.
pub fn power_at_total_n(alpha: f64, effect_f2: f64, numerator_df: u32, total_n: u64) -> PlanResult<FTestPower> {
    let u = u64::from(numerator_df);
    if total_n < u + 2 {
        return Err(PlanError::out_of_range(
            "total_n",
            total_n,
            format!("Total N must be at least {} for {} numerator df", u + 2, u),
        ));
    }
    let v = total_n - u - 1;
    let lambda = effect_f2 * total_n as f64;
    noncentral_f_power(alpha, f64::from(numerator_df), v as f64, lambda)
}

struct Prober<'a> {
    input: &'a FSearchInput,
    probes: u32,
}

impl Prober<'_> {
    fn probe(&mut self, v: u64) -> PlanResult<FTestPower> {
        if self.probes >= self.input.max_probes {
            warn!(
                design = %self.input.design,
                probes = self.probes,
                "noncentral F search exhausted its probe budget"
            );
            return Err(PlanError::convergence(
                self.input.design.clone(),
                self.probes,
                "probe budget exhausted before the minimal N was isolated",
            ));
        }
        self.probes += 1;
        let n = self.input.total_n_for(v);
        let power = power_at_total_n(self.input.alpha, self.input.effect_f2, self.input.numerator_df, n)?;
        trace!(v, n, achieved = power.achieved_power, "probe");
        Ok(power)
    }

    fn meets(&self, power: &FTestPower) -> bool {
        power.achieved_power >= self.input.target_power
    }
}

/// Find the minimal total N whose noncentral-F power meets the target.
///
/// # Example
///
/// ```rust
/// use power_core::stats::{solve_total_n, FSearchInput};
///
/// let input = FSearchInput {
///     design: "Linear regression".to_string(),
///     alpha: 0.05,
///     target_power: 0.80,
///     effect_f2: 0.15,
///     numerator_df: 5,
///     max_probes: 10_000,
/// };
/// let solution = solve_total_n(&input).unwrap();
/// assert!(solution.power.achieved_power >= 0.80);
/// ```
pub fn solve_total_n(input: &FSearchInput) -> PlanResult<FTestSolution> {
    input.validate()?;
    let mut prober = Prober { input, probes: 0 };

    // Bracket: double v until the target is met.
    let mut lower: u64 = 0; // largest v known to miss the target (0 = none tried)
    let mut upper: u64 = 1;
    let mut upper_power = prober.probe(upper)?;
    while !prober.meets(&upper_power) {
        lower = upper;
        upper = upper.saturating_mul(2);
        if upper > MAX_DENOMINATOR_DF {
            warn!(design = %input.design, effect_f2 = input.effect_f2, "noncentral F bracket exceeded df limit");
            return Err(PlanError::convergence(
                input.design.clone(),
                prober.probes,
                format!("required denominator df exceeds {MAX_DENOMINATOR_DF}; effect size too small"),
            ));
        }
        upper_power = prober.probe(upper)?;
    }
    debug!(design = %input.design, lower, upper, probes = prober.probes, "bracketed target power");

    // Bisect: invariant lower misses (or is 0), upper meets.
    while upper - lower > 1 {
        let mid = lower + (upper - lower) / 2;
        let mid_power = prober.probe(mid)?;
        if prober.meets(&mid_power) {
            upper = mid;
            upper_power = mid_power;
        } else {
            lower = mid;
        }
    }

    let total_n = input.total_n_for(upper);
    debug!(
        design = %input.design,
        total_n,
        achieved = upper_power.achieved_power,
        probes = prober.probes,
        "noncentral F search converged"
    );
    Ok(FTestSolution {
        total_n,
        power: upper_power,
        probes: prober.probes,
    })
}
