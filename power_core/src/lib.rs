//! # power_core - Sample-Size Planning Engine
//!
//! `power_core` computes the minimum sample size a study needs to reach a
//! target statistical power, for the common clinical and epidemiological
//! designs: mean and proportion comparisons, case-control and cohort
//! studies, correlation, logistic and linear regression, one-way ANOVA and
//! survival (log-rank). All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions from parameters to a result; no I/O
//! - **One result shape**: Every design returns a [`PlanningResult`]
//! - **Rich Errors**: Structured, serializable error types, never partial results
//! - **Bounded search**: The only iterative calculation (noncentral F) has a probe budget
//!
//! ## Quick Start
//!
//! ```rust
//! use power_core::{plan, DesignParameters, StudyDesign};
//! use power_core::calculations::TwoProportionsInput;
//!
//! let params = DesignParameters::new(0.05, 0.80).with_dropout(0.10);
//! let design = StudyDesign::TwoProportions(TwoProportionsInput {
//!     p1: 0.30,
//!     p2: 0.20,
//!     allocation_ratio: 1.0,
//! });
//!
//! let result = plan(&params, &design).unwrap();
//! assert_eq!(result.arms(), Some((327, 327)));
//!
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! assert!(json.contains("Two proportions"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Every study design and the [`plan`] dispatcher
//! - [`derivations`] - Effect sizes from reported statistics (CIs, 2×2 tables, R²)
//! - [`stats`] - Normal quantiles and the noncentral-F power search
//! - [`params`] - Alpha, power, sidedness and dropout
//! - [`settings`] - Caller defaults
//! - [`request`] - JSON planning requests
//! - [`validation`] - Domain checks and rounding
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod derivations;
pub mod errors;
pub mod params;
pub mod request;
pub mod settings;
pub mod stats;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use calculations::{plan, plan_with_settings, GroupBreakdown, PlanningResult, StudyDesign};
pub use errors::{PlanError, PlanResult};
pub use params::DesignParameters;
pub use request::{ParameterOverrides, PlanningRequest};
pub use settings::PlanningSettings;
