//! Central and noncentral F distributions.
//!
//! The noncentral-F CDF is evaluated as a Poisson mixture of central-F CDFs:
//!
//! ```text
//! P(F ≤ x) = Σⱼ e^(−λ/2) (λ/2)ʲ / j! · I_y(u/2 + j, v/2),   y = u·x / (u·x + v)
//! ```
//!
//! The sum starts at the Poisson mode and walks outward in both directions,
//! so large noncentralities do not underflow the leading weight.
//!
//! The central CDF is `statrs`' [`FisherSnedecor`]. Its `inverse_cdf` is the
//! trait default, a fixed 16-step bisection good to about 1e-4, which is too
//! coarse for the critical value of a minimal-N search, so the quantile is
//! solved here to a relative tolerance of 1e-12 against the same CDF.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use statrs::function::beta::checked_beta_reg;
use statrs::function::gamma::ln_gamma;

use crate::errors::{PlanError, PlanResult};
use crate::stats::root_find::root_find_monotonic;

/// Poisson weights below this are dropped from the mixture
const WEIGHT_EPSILON: f64 = 1e-16;

/// Upper bound on mixture terms in each direction
const MAX_MIXTURE_TERMS: u32 = 100_000;

/// Relative tolerance for the central-F quantile
const QUANTILE_TOLERANCE: f64 = 1e-12;

/// Critical value and power of an upper-tail F test at one design point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FTestPower {
    /// Numerator degrees of freedom u
    pub numerator_df: f64,
    /// Denominator degrees of freedom v
    pub denominator_df: f64,
    /// Noncentrality λ
    pub noncentrality: f64,
    /// Upper 1 − α quantile of the central F(u, v)
    pub critical_f: f64,
    /// 1 − CDF of the noncentral F(u, v, λ) at the critical value
    pub achieved_power: f64,
}

fn check_df(u: f64, v: f64) -> PlanResult<()> {
    if !(u > 0.0 && u.is_finite()) {
        return Err(PlanError::out_of_range("numerator_df", u, "Degrees of freedom must be positive"));
    }
    if !(v > 0.0 && v.is_finite()) {
        return Err(PlanError::out_of_range("denominator_df", v, "Degrees of freedom must be positive"));
    }
    Ok(())
}

fn beta_reg(a: f64, b: f64, y: f64) -> PlanResult<f64> {
    checked_beta_reg(a, b, y)
        .map_err(|e| PlanError::internal(format!("incomplete beta I_{y}({a}, {b}) failed: {e}")))
}

/// Mixing variable of the F → beta transform, clamped to [0, 1]
fn beta_argument(x: f64, u: f64, v: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let ux = u * x;
    (ux / (ux + v)).clamp(0.0, 1.0)
}

/// CDF of the central F(u, v) distribution at x
pub fn central_f_cdf(x: f64, u: f64, v: f64) -> PlanResult<f64> {
    check_df(u, v)?;
    if x.is_nan() {
        return Err(PlanError::internal("central F CDF evaluated at NaN"));
    }
    if x <= 0.0 {
        return Ok(0.0);
    }
    let dist = FisherSnedecor::new(u, v).map_err(|e| PlanError::internal(format!("F({u}, {v}): {e}")))?;
    Ok(dist.cdf(x))
}

/// Quantile of the central F(u, v) distribution at probability p
pub fn central_f_quantile(p: f64, u: f64, v: f64) -> PlanResult<f64> {
    check_df(u, v)?;
    if !(p > 0.0 && p < 1.0) {
        return Err(PlanError::out_of_range("p", p, "Quantile argument must be strictly between 0 and 1"));
    }
    root_find_monotonic(|x| central_f_cdf(x, u, v), 0.0, p, QUANTILE_TOLERANCE)
}

/// CDF of the noncentral F(u, v, λ) distribution at x
pub fn noncentral_f_cdf(x: f64, u: f64, v: f64, lambda: f64) -> PlanResult<f64> {
    check_df(u, v)?;
    if !(lambda >= 0.0 && lambda.is_finite()) {
        return Err(PlanError::out_of_range("noncentrality", lambda, "Noncentrality must be non-negative"));
    }
    if x <= 0.0 {
        return Ok(0.0);
    }
    if lambda == 0.0 {
        return central_f_cdf(x, u, v);
    }

    let y = beta_argument(x, u, v);
    let half = lambda / 2.0;
    let a = u / 2.0;
    let b = v / 2.0;

    let mode = half.floor();
    let mode_weight = (-half + mode * half.ln() - ln_gamma(mode + 1.0)).exp();

    let mut total = 0.0;

    // Downward from the mode (inclusive)
    let mut j = mode;
    let mut weight = mode_weight;
    let mut terms = 0;
    loop {
        total += weight * beta_reg(a + j, b, y)?;
        if j <= 0.0 {
            break;
        }
        weight *= j / half;
        j -= 1.0;
        terms += 1;
        if weight < WEIGHT_EPSILON || terms >= MAX_MIXTURE_TERMS {
            break;
        }
    }

    // Upward from mode + 1
    let mut j = mode + 1.0;
    let mut weight = mode_weight * half / j;
    let mut terms = 0;
    while weight >= WEIGHT_EPSILON {
        total += weight * beta_reg(a + j, b, y)?;
        j += 1.0;
        weight *= half / j;
        terms += 1;
        if terms >= MAX_MIXTURE_TERMS {
            return Err(PlanError::internal(format!(
                "noncentral F mixture did not settle for lambda = {lambda}"
            )));
        }
    }

    if !total.is_finite() {
        return Err(PlanError::internal("noncentral F CDF is not finite"));
    }
    Ok(total.clamp(0.0, 1.0))
}

/// Power of the upper-tail F test: 1 − CDF of F(u, v, λ) at the central
/// 1 − α critical value.
pub fn noncentral_f_power(alpha: f64, u: f64, v: f64, lambda: f64) -> PlanResult<FTestPower> {
    let critical_f = central_f_quantile(1.0 - alpha, u, v)?;
    let achieved_power = 1.0 - noncentral_f_cdf(critical_f, u, v, lambda)?;
    Ok(FTestPower {
        numerator_df: u,
        denominator_df: v,
        noncentrality: lambda,
        critical_f,
        achieved_power,
    })
}
