//! # F-Test Designs
//!
//! One-way fixed-effects ANOVA and multiple linear regression, both sized by
//! searching for the minimal total N whose noncentral-F power meets the
//! target (see [`crate::stats::f_search`]).
//!
//! | Design | u | f² |
//! |--------|---|----|
//! | ANOVA | k − 1 | Cohen's f squared |
//! | Linear regression | predictors | Cohen's f² |
//!
//! The F test is upper-tailed, so `two_sided` has no effect on either design.
//! ANOVA totals are balanced upward to a multiple of k after dropout.
//!
//! ## Example
//!
//! ```rust
//! use power_core::DesignParameters;
//! use power_core::calculations::f_test::{anova_oneway, AnovaInput};
//!
//! let result = anova_oneway(&DesignParameters::default(), &AnovaInput { effect_f: 0.25, k_groups: 3 }).unwrap();
//! assert_eq!(result.n_required % 3, 0);
//! assert!(result.f_test.unwrap().achieved_power >= 0.80);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{GroupBreakdown, PlanningResult};
use crate::errors::PlanResult;
use crate::params::DesignParameters;
use crate::stats::f_search::{solve_total_n, FSearchInput, FTestSolution, DEFAULT_MAX_PROBES};
use crate::validation::{adjust_for_dropout, validate_count, validate_positive};

pub const LINEAR_REGRESSION: &str = "Multiple linear regression";
pub const ANOVA_ONEWAY: &str = "One-way ANOVA";

/// Effect size and model size for a multiple regression omnibus test.
///
/// ## JSON Example
///
/// ```json
/// { "f2": 0.15, "predictors": 5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressionInput {
    /// Cohen's f²
    pub f2: f64,
    /// Number of predictors tested (numerator df)
    pub predictors: u32,
}

impl LinearRegressionInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_positive(self.f2, "f2")?;
        validate_count(self.predictors, 1, "predictors")?;
        Ok(())
    }
}

/// Effect size and number of groups for a one-way ANOVA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnovaInput {
    /// Cohen's f
    pub effect_f: f64,
    /// Number of groups k
    pub k_groups: u32,
}

impl AnovaInput {
    pub fn validate(&self) -> PlanResult<()> {
        validate_positive(self.effect_f, "effect_f")?;
        validate_count(self.k_groups, 2, "k_groups")?;
        Ok(())
    }
}

fn search(
    design: &str,
    params: &DesignParameters,
    effect_f2: f64,
    numerator_df: u32,
    max_probes: u32,
) -> PlanResult<FTestSolution> {
    params.validate()?;
    solve_total_n(&FSearchInput {
        design: design.to_string(),
        alpha: params.alpha,
        target_power: params.power,
        effect_f2,
        numerator_df,
        max_probes,
    })
}

/// Multiple linear regression with the default probe budget.
pub fn linear_regression(params: &DesignParameters, input: &LinearRegressionInput) -> PlanResult<PlanningResult> {
    linear_regression_with_budget(params, input, DEFAULT_MAX_PROBES)
}

/// Multiple linear regression with an explicit probe budget.
pub fn linear_regression_with_budget(
    params: &DesignParameters,
    input: &LinearRegressionInput,
    max_probes: u32,
) -> PlanResult<PlanningResult> {
    input.validate()?;
    let solution = search(LINEAR_REGRESSION, params, input.f2, input.predictors, max_probes)?;
    debug!(
        n = solution.total_n,
        probes = solution.probes,
        power = solution.power.achieved_power,
        "linear regression"
    );

    let mut result = PlanningResult::single(
        LINEAR_REGRESSION,
        solution.total_n,
        params.dropout_rate,
        "Minimal N with noncentral F power >= target; v = N - u - 1, lambda = f2 * N",
        &[
            "Multiple linear regression (omnibus F test)",
            "Effect size expressed as Cohen's f2",
            "Power from the noncentral F distribution",
        ],
    )?;
    result.f_test = Some(solution.power);
    Ok(result)
}

/// One-way ANOVA with the default probe budget.
pub fn anova_oneway(params: &DesignParameters, input: &AnovaInput) -> PlanResult<PlanningResult> {
    anova_oneway_with_budget(params, input, DEFAULT_MAX_PROBES)
}

/// One-way ANOVA with an explicit probe budget.
pub fn anova_oneway_with_budget(
    params: &DesignParameters,
    input: &AnovaInput,
    max_probes: u32,
) -> PlanResult<PlanningResult> {
    input.validate()?;
    let k = input.k_groups;
    let solution = search(ANOVA_ONEWAY, params, input.effect_f * input.effect_f, k - 1, max_probes)?;

    let adjusted = adjust_for_dropout(solution.total_n, params.dropout_rate)?;
    let n_per_group = adjusted.div_ceil(u64::from(k));
    let n_required = n_per_group * u64::from(k);
    debug!(
        n = solution.total_n,
        adjusted,
        n_per_group,
        probes = solution.probes,
        "one-way ANOVA"
    );

    Ok(PlanningResult {
        design: ANOVA_ONEWAY.to_string(),
        n_required,
        n_before_dropout: solution.total_n,
        groups: GroupBreakdown::Balanced { k_groups: k, n_per_group },
        required_events: None,
        f_test: Some(solution.power),
        formula: "Minimal N with noncentral F power >= target; u = k - 1, v = N - k, lambda = f^2 * N".to_string(),
        assumptions: vec![
            "One-way fixed effect ANOVA".to_string(),
            "Balanced design assumed".to_string(),
            "Effect size expressed as Cohen's f".to_string(),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::f_search::power_at_total_n;

    #[test]
    fn test_regression_medium_effect() {
        let input = LinearRegressionInput { f2: 0.15, predictors: 5 };
        let result = linear_regression(&DesignParameters::default(), &input).unwrap();
        assert!((89..=95).contains(&result.n_required), "N = {}", result.n_required);
        let f_test = result.f_test.unwrap();
        assert!(f_test.achieved_power >= 0.80);
        assert_eq!(f_test.numerator_df, 5.0);
        assert!((f_test.noncentrality - 0.15 * result.n_before_dropout as f64).abs() < 1e-9);
    }

    #[test]
    fn test_regression_is_minimal() {
        let params = DesignParameters::default();
        let input = LinearRegressionInput { f2: 0.10, predictors: 3 };
        let n = linear_regression(&params, &input).unwrap().n_before_dropout;
        let below = power_at_total_n(params.alpha, input.f2, input.predictors, n - 1).unwrap();
        assert!(below.achieved_power < params.power);
    }

    #[test]
    fn test_anova_medium_effect_balanced() {
        let input = AnovaInput { effect_f: 0.25, k_groups: 3 };
        let result = anova_oneway(&DesignParameters::default(), &input).unwrap();
        assert_eq!(result.groups, GroupBreakdown::Balanced { k_groups: 3, n_per_group: 53 });
        assert_eq!(result.n_required, 159);
        assert!(result.n_required >= result.n_before_dropout);
    }

    #[test]
    fn test_anova_dropout_then_balance() {
        let params = DesignParameters::default().with_dropout(0.2);
        let input = AnovaInput { effect_f: 0.40, k_groups: 4 };
        let result = anova_oneway(&params, &input).unwrap();
        let inflated = adjust_for_dropout(result.n_before_dropout, 0.2).unwrap();
        assert_eq!(result.n_required % 4, 0);
        assert!(result.n_required >= inflated && result.n_required < inflated + 4);
    }

    #[test]
    fn test_validation() {
        let params = DesignParameters::default();
        let one_group = AnovaInput { effect_f: 0.25, k_groups: 1 };
        assert_eq!(anova_oneway(&params, &one_group).unwrap_err().field(), Some("k_groups"));
        let no_predictors = LinearRegressionInput { f2: 0.15, predictors: 0 };
        assert_eq!(linear_regression(&params, &no_predictors).unwrap_err().field(), Some("predictors"));
        let no_effect = LinearRegressionInput { f2: 0.0, predictors: 2 };
        assert_eq!(linear_regression(&params, &no_effect).unwrap_err().field(), Some("f2"));
    }

    #[test]
    fn test_small_budget_fails_to_converge() {
        let input = LinearRegressionInput { f2: 0.02, predictors: 4 };
        let err = linear_regression_with_budget(&DesignParameters::default(), &input, 2).unwrap_err();
        assert_eq!(err.error_code(), "CONVERGENCE");
    }
}
