//! # Proportion Comparisons
//!
//! Normal-approximation sample sizes for binary outcomes.
//!
//! One proportion:
//!
//! ```text
//! n = (Zα·√(p0(1−p0)) + Zβ·√(p1(1−p1)))² / (p1 − p0)²
//! ```
//!
//! Two proportions (pooled-variance Z test, r = n₂ / n₁):
//!
//! ```text
//! p̄    = (p1 + r·p2) / (1 + r)
//! Var₀ = p̄(1 − p̄)(1 + 1/r)
//! Var₁ = p1(1 − p1) + p2(1 − p2)/r
//! n₁   = (Zα·√Var₀ + Zβ·√Var₁)² / (p1 − p2)²,   n₂ = r·n₁
//! ```
//!
//! n₂ is ceiled from the raw r·n₁, so swapping (p1, r) with (p2, 1/r) swaps
//! the two arms exactly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::means::default_ratio;
use crate::calculations::{CriticalValues, PlanningResult};
use crate::errors::{PlanError, PlanResult};
use crate::params::DesignParameters;
use crate::validation::{ceil_count, validate_positive, validate_proportion};

pub const ONE_PROPORTION: &str = "One proportion";
pub const TWO_PROPORTIONS: &str = "Two proportions";

/// Null and alternative proportions for a one-sample test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneProportionInput {
    /// Null (reference) proportion
    pub p0: f64,
    /// Expected proportion under the alternative
    pub p1: f64,
}

impl OneProportionInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_proportion(self.p0, "p0")?;
        validate_proportion(self.p1, "p1")?;
        if self.p1 == self.p0 {
            return Err(PlanError::arithmetic_domain("p1", self.p1, "p1 must differ from p0"));
        }
        Ok(())
    }
}

/// Group proportions and allocation ratio for two independent groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoProportionsInput {
    /// Proportion in group 1
    pub p1: f64,
    /// Proportion in group 2
    pub p2: f64,
    /// Allocation ratio r = n₂ / n₁
    #[serde(default = "default_ratio")]
    pub allocation_ratio: f64,
}

impl TwoProportionsInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_proportion(self.p1, "p1")?;
        validate_proportion(self.p2, "p2")?;
        validate_positive(self.allocation_ratio, "allocation_ratio")?;
        if self.p1 == self.p2 {
            return Err(PlanError::arithmetic_domain(
                "p2",
                self.p2,
                "Proportions must differ to compute sample size",
            ));
        }
        Ok(())
    }
}

/// One-sample proportion test.
pub fn one_proportion(params: &DesignParameters, input: &OneProportionInput) -> PlanResult<PlanningResult> {
    input.validate()?;
    let z = CriticalValues::from_params(params)?;
    let OneProportionInput { p0, p1 } = *input;

    let numerator = (z.z_alpha * (p0 * (1.0 - p0)).sqrt() + z.z_beta * (p1 * (1.0 - p1)).sqrt()).powi(2);
    let n = ceil_count(numerator / (p1 - p0).powi(2), "n")?;
    debug!(n, p0, p1, "one proportion");

    PlanningResult::single(
        ONE_PROPORTION,
        n,
        params.dropout_rate,
        "Normal approximation for one-sample proportion",
        &[
            "Large sample normal approximation",
            "Binomial distribution",
            "Two-sided or one-sided test specified",
        ],
    )
}

/// Two independent proportions, pooled-variance Z test.
pub fn two_proportions(params: &DesignParameters, input: &TwoProportionsInput) -> PlanResult<PlanningResult> {
    input.validate()?;
    let z = CriticalValues::from_params(params)?;
    let TwoProportionsInput { p1, p2, allocation_ratio: r } = *input;

    let p_bar = (p1 + r * p2) / (1.0 + r);
    let var_null = p_bar * (1.0 - p_bar) * (1.0 + 1.0 / r);
    let var_alt = p1 * (1.0 - p1) + p2 * (1.0 - p2) / r;

    let n1_raw = (z.z_alpha * var_null.sqrt() + z.z_beta * var_alt.sqrt()).powi(2) / (p1 - p2).powi(2);
    let n1 = ceil_count(n1_raw, "n1")?;
    let n2 = ceil_count(r * n1_raw, "n2")?;
    debug!(n1, n2, p1, p2, r, "two proportions");

    PlanningResult::two_arm(
        TWO_PROPORTIONS,
        n1,
        n2,
        params.dropout_rate,
        "Two-proportion Z-test (pooled variance approach)",
        &[
            "Independent groups",
            "Binary outcome",
            "Normal approximation valid",
            "Adequate expected cell counts",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_proportion_reference() {
        // p0 = 0.5, p1 = 0.65: raw 84.81 -> 85
        let input = OneProportionInput { p0: 0.5, p1: 0.65 };
        let result = one_proportion(&DesignParameters::default(), &input).unwrap();
        assert_eq!(result.n_required, 85);
    }

    #[test]
    fn test_one_proportion_requires_difference() {
        let input = OneProportionInput { p0: 0.4, p1: 0.4 };
        let err = one_proportion(&DesignParameters::default(), &input).unwrap_err();
        assert_eq!(err.error_code(), "ARITHMETIC_DOMAIN");
    }

    #[test]
    fn test_two_proportions_reference() {
        // p1 = 0.3, p2 = 0.2, r = 1: raw 293.15 -> 294 per arm
        let input = TwoProportionsInput {
            p1: 0.3,
            p2: 0.2,
            allocation_ratio: 1.0,
        };
        let result = two_proportions(&DesignParameters::default(), &input).unwrap();
        assert_eq!(result.arms(), Some((294, 294)));
        assert_eq!(result.n_required, 588);
    }

    #[test]
    fn test_two_proportions_symmetry() {
        let params = DesignParameters::default();
        let forward = TwoProportionsInput {
            p1: 0.3,
            p2: 0.2,
            allocation_ratio: 2.0,
        };
        let swapped = TwoProportionsInput {
            p1: 0.2,
            p2: 0.3,
            allocation_ratio: 0.5,
        };
        let (n1, n2) = two_proportions(&params, &forward).unwrap().arms().unwrap();
        let (m1, m2) = two_proportions(&params, &swapped).unwrap().arms().unwrap();
        assert_eq!((n1, n2), (216, 432));
        assert_eq!((m1, m2), (n2, n1));
    }

    #[test]
    fn test_two_proportions_validation() {
        let params = DesignParameters::default();
        let same = TwoProportionsInput {
            p1: 0.2,
            p2: 0.2,
            allocation_ratio: 1.0,
        };
        assert_eq!(two_proportions(&params, &same).unwrap_err().error_code(), "ARITHMETIC_DOMAIN");
        let out_of_range = TwoProportionsInput {
            p1: 1.2,
            p2: 0.2,
            allocation_ratio: 1.0,
        };
        assert_eq!(two_proportions(&params, &out_of_range).unwrap_err().error_code(), "OUT_OF_RANGE");
    }

    #[test]
    fn test_default_allocation_from_json() {
        let input: TwoProportionsInput = serde_json::from_str(r#"{ "p1": 0.3, "p2": 0.2 }"#).unwrap();
        assert_eq!(input.allocation_ratio, 1.0);
    }
}
