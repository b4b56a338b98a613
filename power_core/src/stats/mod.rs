//! # Statistical Primitives
//!
//! Distribution functions the calculators are built on. Special functions
//! (error function inverse, regularized incomplete beta, log-gamma) and the
//! central F distribution come from `statrs`; everything here is a thin,
//! validated layer on top of them.
//!
//! ## Modules
//!
//! - [`normal`] - Standard-normal CDF/quantile and the Zα / Zβ critical values
//! - [`root_find`] - Bracketed bisection for monotone functions
//! - [`noncentral_f`] - Central-F quantile and noncentral-F CDF (Poisson mixture)
//! - [`f_search`] - Minimal-N search over noncentral-F power (ANOVA, regression)

pub mod f_search;
pub mod noncentral_f;
pub mod normal;
pub mod root_find;

pub use f_search::{power_at_total_n, solve_total_n, FSearchInput, FTestSolution};
pub use noncentral_f::{central_f_cdf, central_f_quantile, noncentral_f_cdf, noncentral_f_power, FTestPower};
pub use normal::{std_normal_cdf, std_normal_quantile, z_alpha, z_beta};
