//! Standard-normal helpers.
//!
//! Φ⁻¹(p) = −√2 · erfc⁻¹(2p)

use std::f64::consts::SQRT_2;

use statrs::function::erf::{erfc, erfc_inv};

use crate::errors::{PlanError, PlanResult};

/// Standard-normal CDF Φ(z)
pub fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Standard-normal quantile Φ⁻¹(p) for p in the open interval (0, 1)
pub fn std_normal_quantile(p: f64) -> PlanResult<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(PlanError::out_of_range(
            "p",
            p,
            "Quantile argument must be strictly between 0 and 1",
        ));
    }
    Ok(-SQRT_2 * erfc_inv(2.0 * p))
}

/// Critical value for the type I error rate.
///
/// Φ⁻¹(1 − α/2) for a two-sided test, Φ⁻¹(1 − α) for a one-sided test.
pub fn z_alpha(alpha: f64, two_sided: bool) -> PlanResult<f64> {
    let tail = if two_sided { alpha / 2.0 } else { alpha };
    std_normal_quantile(1.0 - tail)
        .map_err(|_| PlanError::out_of_range("alpha", alpha, "Alpha must be between 0 and 1"))
}

/// Critical value for the target power, Φ⁻¹(power)
pub fn z_beta(power: f64) -> PlanResult<f64> {
    std_normal_quantile(power)
        .map_err(|_| PlanError::out_of_range("power", power, "Power must be between 0 and 1"))
}
