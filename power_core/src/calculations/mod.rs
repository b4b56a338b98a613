//! # Sample-Size Calculations
//!
//! This module contains every supported study design. Each calculation
//! follows the pattern:
//!
//! - `*Input` - Effect specification for the design (JSON-serializable)
//! - a pure function `(&DesignParameters, &*Input) -> PlanResult<PlanningResult>`
//!
//! Every design returns the same [`PlanningResult`] shape, so callers never
//! have to guess which keys a given design filled in.
//!
//! ## Available Calculations
//!
//! - [`means`] - One-sample, paired and two independent means
//! - [`proportions`] - One proportion, two proportions
//! - [`derived`] - Case-control (odds ratio) and cohort (risk ratio), reduced to two proportions
//! - [`association`] - Correlation (Fisher z) and logistic regression (EPV rule)
//! - [`survival`] - Log-rank events formula
//! - [`f_test`] - One-way ANOVA and multiple linear regression (noncentral F)

pub mod association;
pub mod derived;
pub mod f_test;
pub mod means;
pub mod proportions;
pub mod survival;

use serde::{Deserialize, Serialize};

use crate::errors::PlanResult;
use crate::params::DesignParameters;
use crate::settings::PlanningSettings;
use crate::stats::noncentral_f::FTestPower;
use crate::stats::normal::{z_alpha, z_beta};
use crate::validation::adjust_for_dropout;

// Re-export commonly used types
pub use association::{CorrelationInput, LogisticEpvInput};
pub use derived::{CaseControlInput, CohortInput};
pub use f_test::{AnovaInput, LinearRegressionInput};
pub use means::{MeanInput, TwoMeansInput};
pub use proportions::{OneProportionInput, TwoProportionsInput};
pub use survival::LogrankInput;

/// How the required sample size splits across study arms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GroupBreakdown {
    /// One group (or paired observations)
    Single,
    /// Two arms with their own pre- and post-dropout sizes
    TwoArm {
        n1: u64,
        n2: u64,
        n1_before_dropout: u64,
        n2_before_dropout: u64,
    },
    /// k equal-sized groups
    Balanced { k_groups: u32, n_per_group: u64 },
}

/// Result of a sample-size calculation.
///
/// `n_required >= n_before_dropout` always holds; both are whole participants.
///
/// ## JSON Example
///
/// ```json
/// {
///   "design": "One-sample mean",
///   "n_required": 20,
///   "n_before_dropout": 18,
///   "groups": { "kind": "Single" },
///   "formula": "n = ((Z_alpha + Z_beta) * sd / delta)^2",
///   "assumptions": ["Outcome approximately normally distributed"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningResult {
    /// Display name of the design
    pub design: String,

    /// Total participants to enroll (after dropout inflation)
    pub n_required: u64,

    /// Total participants before dropout inflation
    pub n_before_dropout: u64,

    /// Per-arm breakdown
    pub groups: GroupBreakdown,

    /// Events needed (EPV rule, log-rank)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_events: Option<u64>,

    /// Test characteristics at the solution N (ANOVA, linear regression)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_test: Option<FTestPower>,

    /// Formula or method used
    pub formula: String,

    /// Statistical model assumptions, in reporting order
    pub assumptions: Vec<String>,
}

impl PlanningResult {
    /// Single-group result; dropout is applied to `n_before_dropout` here.
    pub(crate) fn single(
        design: &str,
        n_before_dropout: u64,
        dropout_rate: f64,
        formula: &str,
        assumptions: &[&str],
    ) -> PlanResult<Self> {
        Ok(PlanningResult {
            design: design.to_string(),
            n_required: adjust_for_dropout(n_before_dropout, dropout_rate)?,
            n_before_dropout,
            groups: GroupBreakdown::Single,
            required_events: None,
            f_test: None,
            formula: formula.to_string(),
            assumptions: assumptions.iter().map(|a| a.to_string()).collect(),
        })
    }

    /// Two-arm result; dropout is applied to each arm separately.
    pub(crate) fn two_arm(
        design: &str,
        n1_before_dropout: u64,
        n2_before_dropout: u64,
        dropout_rate: f64,
        formula: &str,
        assumptions: &[&str],
    ) -> PlanResult<Self> {
        let n1 = adjust_for_dropout(n1_before_dropout, dropout_rate)?;
        let n2 = adjust_for_dropout(n2_before_dropout, dropout_rate)?;
        Ok(PlanningResult {
            design: design.to_string(),
            n_required: n1 + n2,
            n_before_dropout: n1_before_dropout + n2_before_dropout,
            groups: GroupBreakdown::TwoArm {
                n1,
                n2,
                n1_before_dropout,
                n2_before_dropout,
            },
            required_events: None,
            f_test: None,
            formula: formula.to_string(),
            assumptions: assumptions.iter().map(|a| a.to_string()).collect(),
        })
    }

    /// Replace the design label and formula, append an assumption.
    /// Used by designs that reduce to another calculator.
    pub(crate) fn relabel(mut self, design: &str, formula: &str, extra_assumption: &str) -> Self {
        self.design = design.to_string();
        self.formula = formula.to_string();
        self.assumptions.push(extra_assumption.to_string());
        self
    }

    /// Sizes of the two arms (after dropout), if this is a two-arm result
    pub fn arms(&self) -> Option<(u64, u64)> {
        match self.groups {
            GroupBreakdown::TwoArm { n1, n2, .. } => Some((n1, n2)),
            _ => None,
        }
    }
}

/// Validated Zα and Zβ for one calculation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CriticalValues {
    pub z_alpha: f64,
    pub z_beta: f64,
}

impl CriticalValues {
    pub(crate) fn from_params(params: &DesignParameters) -> PlanResult<Self> {
        params.validate()?;
        Ok(CriticalValues {
            z_alpha: z_alpha(params.alpha, params.two_sided)?,
            z_beta: z_beta(params.power)?,
        })
    }

    /// Zα + Zβ
    pub(crate) fn sum(&self) -> f64 {
        self.z_alpha + self.z_beta
    }
}

/// Every supported design with its effect specification.
///
/// ## JSON Example
///
/// ```json
/// { "design": "one_sample_mean", "sd": 15.0, "delta": 10.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "design", rename_all = "snake_case")]
pub enum StudyDesign {
    /// One-sample mean against a reference value
    OneSampleMean(MeanInput),
    /// Paired mean difference (`sd` is the SD of differences)
    PairedMean(MeanInput),
    /// Two independent means
    TwoIndependentMeans(TwoMeansInput),
    /// One proportion against a null value
    OneProportion(OneProportionInput),
    /// Two independent proportions
    TwoProportions(TwoProportionsInput),
    /// Unmatched case-control study, target odds ratio
    CaseControlOr(CaseControlInput),
    /// Cohort or RCT with binary outcome, target risk ratio
    CohortRr(CohortInput),
    /// Correlation coefficient against zero
    Correlation(CorrelationInput),
    /// Logistic regression, events-per-variable rule
    LogisticEpv(LogisticEpvInput),
    /// Multiple linear regression (Cohen's f²)
    LinearRegression(LinearRegressionInput),
    /// One-way ANOVA (Cohen's f)
    AnovaOneway(AnovaInput),
    /// Survival, log-rank test
    Logrank(LogrankInput),
}

impl StudyDesign {
    /// Display name for the design
    pub fn label(&self) -> &'static str {
        match self {
            StudyDesign::OneSampleMean(_) => means::ONE_SAMPLE_MEAN,
            StudyDesign::PairedMean(_) => means::PAIRED_MEAN,
            StudyDesign::TwoIndependentMeans(_) => means::TWO_INDEPENDENT_MEANS,
            StudyDesign::OneProportion(_) => proportions::ONE_PROPORTION,
            StudyDesign::TwoProportions(_) => proportions::TWO_PROPORTIONS,
            StudyDesign::CaseControlOr(_) => derived::CASE_CONTROL_OR,
            StudyDesign::CohortRr(_) => derived::COHORT_RR,
            StudyDesign::Correlation(_) => association::CORRELATION,
            StudyDesign::LogisticEpv(_) => association::LOGISTIC_EPV,
            StudyDesign::LinearRegression(_) => f_test::LINEAR_REGRESSION,
            StudyDesign::AnovaOneway(_) => f_test::ANOVA_ONEWAY,
            StudyDesign::Logrank(_) => survival::LOGRANK,
        }
    }

    /// Whether the `two_sided` flag affects this design.
    ///
    /// F tests are upper-tailed and the EPV rule is not a test at all, so a
    /// front end should not offer a sidedness toggle for them.
    pub fn uses_sidedness(&self) -> bool {
        !matches!(
            self,
            StudyDesign::LinearRegression(_) | StudyDesign::AnovaOneway(_) | StudyDesign::LogisticEpv(_)
        )
    }
}

/// Run the calculation for a design with default settings.
///
/// # Example
///
/// ```rust
/// use power_core::{plan, DesignParameters, StudyDesign};
/// use power_core::calculations::MeanInput;
///
/// let params = DesignParameters::new(0.05, 0.80);
/// let design = StudyDesign::OneSampleMean(MeanInput { sd: 15.0, delta: 10.0 });
/// let result = plan(&params, &design).unwrap();
/// assert_eq!(result.n_required, 18);
/// ```
pub fn plan(params: &DesignParameters, design: &StudyDesign) -> PlanResult<PlanningResult> {
    plan_with_settings(params, design, &PlanningSettings::default())
}

/// Run the calculation for a design, taking the EPV default and the
/// noncentral-F probe budget from `settings`.
pub fn plan_with_settings(
    params: &DesignParameters,
    design: &StudyDesign,
    settings: &PlanningSettings,
) -> PlanResult<PlanningResult> {
    match design {
        StudyDesign::OneSampleMean(input) => means::one_sample_mean(params, input),
        StudyDesign::PairedMean(input) => means::paired_mean(params, input),
        StudyDesign::TwoIndependentMeans(input) => means::two_independent_means(params, input),
        StudyDesign::OneProportion(input) => proportions::one_proportion(params, input),
        StudyDesign::TwoProportions(input) => proportions::two_proportions(params, input),
        StudyDesign::CaseControlOr(input) => derived::case_control_or(params, input),
        StudyDesign::CohortRr(input) => derived::cohort_rr(params, input),
        StudyDesign::Correlation(input) => association::correlation(params, input),
        StudyDesign::LogisticEpv(input) => {
            let input = LogisticEpvInput {
                epv: Some(input.epv.unwrap_or(settings.default_epv)),
                ..input.clone()
            };
            association::logistic_epv(params, &input)
        }
        StudyDesign::LinearRegression(input) => {
            f_test::linear_regression_with_budget(params, input, settings.max_probes)
        }
        StudyDesign::AnovaOneway(input) => f_test::anova_oneway_with_budget(params, input, settings.max_probes),
        StudyDesign::Logrank(input) => survival::logrank(params, input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_json_tagging() {
        let json = r#"{ "design": "two_proportions", "p1": 0.3, "p2": 0.2, "allocation_ratio": 1.0 }"#;
        let design: StudyDesign = serde_json::from_str(json).unwrap();
        assert_eq!(design.label(), "Two proportions");
        assert!(design.uses_sidedness());
    }

    #[test]
    fn test_f_tests_ignore_sidedness() {
        let design = StudyDesign::AnovaOneway(AnovaInput { effect_f: 0.25, k_groups: 3 });
        assert!(!design.uses_sidedness());
        let one = plan(&DesignParameters::default().with_two_sided(false), &design).unwrap();
        let two = plan(&DesignParameters::default(), &design).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn test_settings_supply_epv() {
        let design = StudyDesign::LogisticEpv(LogisticEpvInput {
            event_rate: 0.2,
            predictors: 5,
            epv: None,
        });
        let settings = PlanningSettings {
            default_epv: 20,
            ..Default::default()
        };
        let result = plan_with_settings(&DesignParameters::default(), &design, &settings).unwrap();
        assert_eq!(result.required_events, Some(100));
        assert_eq!(result.n_required, 500);
    }

    #[test]
    fn test_settings_probe_budget() {
        let design = StudyDesign::LinearRegression(LinearRegressionInput { f2: 0.02, predictors: 4 });
        let settings = PlanningSettings {
            max_probes: 2,
            ..Default::default()
        };
        let err = plan_with_settings(&DesignParameters::default(), &design, &settings).unwrap_err();
        assert_eq!(err.error_code(), "CONVERGENCE");
    }

    #[test]
    fn test_result_serialization() {
        let design = StudyDesign::TwoIndependentMeans(TwoMeansInput {
            sd: 10.0,
            delta: 5.0,
            allocation_ratio: 1.0,
        });
        let result = plan(&DesignParameters::default().with_dropout(0.1), &design).unwrap();
        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("\"kind\": \"TwoArm\""));
        assert!(!json.contains("f_test"));
        let roundtrip: PlanningResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, roundtrip);
    }
}
