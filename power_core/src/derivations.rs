//! # Effect-Size Derivations
//!
//! Conversions from statistics commonly reported in published abstracts
//! (counts, percentages, confidence intervals, 2×2 tables, R², η²) into the
//! inputs the calculators take. Every helper is stateless and independent;
//! nothing here is called automatically by a calculator except
//! [`p1_from_or`] and [`p1_from_rr`], which the case-control and cohort
//! designs use for their reductions.
//!
//! Confidence intervals are assumed to be 95% Wald intervals.
//!
//! ## Example
//!
//! ```rust
//! use power_core::derivations::{odds_ratio_from_2x2, p1_from_or};
//!
//! let or = odds_ratio_from_2x2(30.0, 70.0, 15.0, 85.0).unwrap();
//! assert!((or - 2.4286).abs() < 1e-4);
//!
//! let p1 = p1_from_or(0.3, 2.0).unwrap();
//! assert!((p1 - 0.4615).abs() < 1e-4);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{PlanError, PlanResult};
use crate::stats::normal::std_normal_quantile;
use crate::validation::{validate_positive, validate_proportion};

/// Divisor converting an interquartile range to an SD under normality
pub const IQR_TO_SD: f64 = 1.35;

fn z_95() -> PlanResult<f64> {
    std_normal_quantile(0.975)
}

fn validate_interval(lower: f64, upper: f64) -> PlanResult<()> {
    if !(lower.is_finite() && upper.is_finite()) {
        return Err(PlanError::out_of_range("ci", format!("[{lower}, {upper}]"), "Bounds must be finite"));
    }
    if lower >= upper {
        return Err(PlanError::out_of_range(
            "ci",
            format!("[{lower}, {upper}]"),
            "Lower bound must be below upper bound",
        ));
    }
    Ok(())
}

fn clamp_unit(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}

// ============================================================================
// Proportions and ratios
// ============================================================================

/// Proportion of `events` among `total`.
pub fn proportion_from_counts(events: u64, total: u64) -> PlanResult<f64> {
    if total == 0 {
        return Err(PlanError::out_of_range("total", total, "Total must be positive"));
    }
    if events > total {
        return Err(PlanError::out_of_range("events", events, "Events cannot exceed total"));
    }
    Ok(events as f64 / total as f64)
}

/// Proportion from a percentage in [0, 100].
pub fn proportion_from_percent(percent: f64) -> PlanResult<f64> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(PlanError::out_of_range("percent", percent, "Percentage must be between 0 and 100"));
    }
    Ok(percent / 100.0)
}

/// Odds ratio `(a·d) / (b·c)` from a 2×2 table.
///
/// ```text
///           Exposed  Unexposed
/// Case         a         b
/// Control      c         d
/// ```
pub fn odds_ratio_from_2x2(a: f64, b: f64, c: f64, d: f64) -> PlanResult<f64> {
    for (name, cell) in [("a", a), ("b", b), ("c", c), ("d", d)] {
        if !(cell > 0.0 && cell.is_finite()) {
            return Err(PlanError::arithmetic_domain(
                name,
                cell,
                "All 2x2 cells must be positive",
            ));
        }
    }
    Ok((a * d) / (b * c))
}

/// Odds ratio between two risks, `(p1/(1−p1)) / (p0/(1−p0))`.
pub fn odds_ratio_from_risks(p1: f64, p0: f64) -> PlanResult<f64> {
    validate_proportion(p1, "p1")?;
    validate_proportion(p0, "p0")?;
    Ok((p1 / (1.0 - p1)) / (p0 / (1.0 - p0)))
}

/// Risk ratio `p1 / p0`.
pub fn rr_from_risks(p1: f64, p0: f64) -> PlanResult<f64> {
    validate_proportion(p1, "p1")?;
    validate_proportion(p0, "p0")?;
    Ok(p1 / p0)
}

/// Risk in the exposed group from the control risk and an odds ratio:
/// `p1 = OR·p0 / (1 − p0 + OR·p0)`.
pub fn p1_from_or(p0: f64, odds_ratio: f64) -> PlanResult<f64> {
    validate_proportion(p0, "p0")?;
    validate_positive(odds_ratio, "odds_ratio")?;
    Ok(odds_ratio * p0 / (1.0 - p0 + odds_ratio * p0))
}

/// Risk in the exposed group from the baseline risk and a risk ratio.
/// Fails when `RR·p0 ≥ 1`.
pub fn p1_from_rr(p0: f64, risk_ratio: f64) -> PlanResult<f64> {
    validate_proportion(p0, "baseline_risk")?;
    validate_positive(risk_ratio, "risk_ratio")?;
    let p1 = p0 * risk_ratio;
    if p1 >= 1.0 {
        return Err(PlanError::out_of_range(
            "risk_ratio",
            risk_ratio,
            format!("Derived risk {p1:.4} must be below 1"),
        ));
    }
    Ok(p1)
}

/// RR to OR given the baseline risk: `OR = RR·(1 − p0) / (1 − RR·p0)`.
pub fn rr_to_or(risk_ratio: f64, p0: f64) -> PlanResult<f64> {
    validate_positive(risk_ratio, "risk_ratio")?;
    validate_proportion(p0, "p0")?;
    let denom = 1.0 - risk_ratio * p0;
    if denom <= 0.0 {
        return Err(PlanError::out_of_range(
            "risk_ratio",
            risk_ratio,
            "RR x p0 must be below 1",
        ));
    }
    Ok(risk_ratio * (1.0 - p0) / denom)
}

/// OR to RR given the baseline risk: `RR = OR / (1 − p0 + p0·OR)`.
pub fn or_to_rr(odds_ratio: f64, p0: f64) -> PlanResult<f64> {
    validate_positive(odds_ratio, "odds_ratio")?;
    validate_proportion(p0, "p0")?;
    Ok(odds_ratio / (1.0 - p0 + p0 * odds_ratio))
}

/// Whether a reported change raises or lowers the baseline risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectDirection {
    Increase,
    Decrease,
}

/// Comparator risk from a baseline risk and RR, clamped to [0, 1].
pub fn p2_from_rr(p1: f64, risk_ratio: f64) -> PlanResult<f64> {
    validate_proportion(p1, "p1")?;
    validate_positive(risk_ratio, "risk_ratio")?;
    Ok(clamp_unit(p1 * risk_ratio))
}

/// Comparator risk from a baseline risk and OR, clamped to [0, 1].
pub fn p2_from_or(p1: f64, odds_ratio: f64) -> PlanResult<f64> {
    Ok(clamp_unit(p1_from_or(p1, odds_ratio)?))
}

/// Comparator risk from an absolute risk difference, clamped to [0, 1].
pub fn p2_from_arr(p1: f64, arr: f64, direction: EffectDirection) -> PlanResult<f64> {
    validate_proportion(p1, "p1")?;
    let arr = arr.abs();
    Ok(match direction {
        EffectDirection::Increase => clamp_unit(p1 + arr),
        EffectDirection::Decrease => clamp_unit(p1 - arr),
    })
}

/// Comparator risk from a relative risk change, clamped to [0, 1].
pub fn p2_from_rrr(p1: f64, rrr: f64, direction: EffectDirection) -> PlanResult<f64> {
    validate_proportion(p1, "p1")?;
    let rrr = rrr.abs();
    Ok(match direction {
        EffectDirection::Increase => clamp_unit(p1 * (1.0 + rrr)),
        EffectDirection::Decrease => clamp_unit(p1 * (1.0 - rrr)),
    })
}

// ============================================================================
// Standard errors and implied sample sizes
// ============================================================================

/// SE from a symmetric CI on the natural scale: `(upper − lower) / (2·Z)`.
pub fn se_from_ci(lower: f64, upper: f64) -> PlanResult<f64> {
    validate_interval(lower, upper)?;
    Ok((upper - lower) / (2.0 * z_95()?))
}

/// SE of a log ratio (log OR, log RR, log HR) from its CI.
pub fn se_log_from_ci(lower: f64, upper: f64) -> PlanResult<f64> {
    for (name, bound) in [("ci_lower", lower), ("ci_upper", upper)] {
        if !(bound > 0.0) {
            return Err(PlanError::arithmetic_domain(
                name,
                bound,
                "Ratio CI bounds must be positive to take logarithms",
            ));
        }
    }
    validate_interval(lower, upper)?;
    Ok((upper.ln() - lower.ln()) / (2.0 * z_95()?))
}

/// Sample size implied by a Wald CI for a proportion: `n ≈ p(1−p) / SE²`.
pub fn implied_n_from_wald_ci(p_hat: f64, se: f64) -> PlanResult<f64> {
    validate_proportion(p_hat, "p_hat")?;
    validate_positive(se, "se")?;
    Ok(p_hat * (1.0 - p_hat) / (se * se))
}

// ============================================================================
// Standard deviations
// ============================================================================

/// SD from a 95% CI for a mean: `SE·√n`.
pub fn sd_from_ci(lower: f64, upper: f64, n: u32) -> PlanResult<f64> {
    sd_from_se(se_from_ci(lower, upper)?, n)
}

/// SD from a standard error: `SE·√n`.
pub fn sd_from_se(se: f64, n: u32) -> PlanResult<f64> {
    validate_positive(se, "se")?;
    if n < 2 {
        return Err(PlanError::out_of_range("n", n, "Sample size must be at least 2"));
    }
    Ok(se * f64::from(n).sqrt())
}

/// SD approximated from an interquartile range, `IQR / 1.35`.
pub fn sd_from_iqr(iqr: f64) -> PlanResult<f64> {
    Ok(validate_positive(iqr, "iqr")? / IQR_TO_SD)
}

/// SD of paired differences: `√(sd1² + sd2² − 2ρ·sd1·sd2)`.
pub fn sd_of_differences(sd_before: f64, sd_after: f64, rho: f64) -> PlanResult<f64> {
    validate_positive(sd_before, "sd_before")?;
    validate_positive(sd_after, "sd_after")?;
    if !(-1.0..=1.0).contains(&rho) {
        return Err(PlanError::out_of_range("rho", rho, "Correlation must be between -1 and 1"));
    }
    let variance = sd_before.powi(2) + sd_after.powi(2) - 2.0 * rho * sd_before * sd_after;
    if variance <= 0.0 {
        return Err(PlanError::arithmetic_domain(
            "rho",
            rho,
            "Differences have zero variance",
        ));
    }
    Ok(variance.sqrt())
}

// ============================================================================
// Variance-explained effect sizes
// ============================================================================

fn validate_r2(value: f64, field: &str) -> PlanResult<f64> {
    if !(value > 0.0 && value < 1.0) {
        return Err(PlanError::out_of_range(field, value, "Must be between 0 and 1 (exclusive)"));
    }
    Ok(value)
}

/// Cohen's f² from R² (or ΔR²): `R² / (1 − R²)`.
pub fn f2_from_r2(r2: f64) -> PlanResult<f64> {
    let r2 = validate_r2(r2, "r2")?;
    Ok(r2 / (1.0 - r2))
}

/// Cohen's f from η²: `√(η² / (1 − η²))`.
pub fn f_from_eta2(eta2: f64) -> PlanResult<f64> {
    let eta2 = validate_r2(eta2, "eta2")?;
    Ok((eta2 / (1.0 - eta2)).sqrt())
}

/// Cohen's f from expected group means and a common within-group SD.
pub fn f_from_group_means(means: &[f64], sd_within: f64) -> PlanResult<f64> {
    validate_positive(sd_within, "sd_within")?;
    if means.len() < 2 {
        return Err(PlanError::out_of_range("means", means.len(), "At least two group means are required"));
    }
    let k = means.len() as f64;
    let grand = means.iter().sum::<f64>() / k;
    let var_means = means.iter().map(|m| (m - grand).powi(2)).sum::<f64>() / k;
    if !(var_means > 0.0) {
        return Err(PlanError::arithmetic_domain("means", format!("{means:?}"), "Group means must differ"));
    }
    Ok(var_means.sqrt() / sd_within)
}

/// Correlation from R², with the requested sign.
pub fn r_from_r2(r2: f64, negative: bool) -> PlanResult<f64> {
    let r = validate_r2(r2, "r2")?.sqrt();
    Ok(if negative { -r } else { r })
}

/// Fisher z-transform `atanh(r)`.
pub fn fisher_z(r: f64) -> PlanResult<f64> {
    if !(r > -1.0 && r < 1.0) {
        return Err(PlanError::out_of_range("r", r, "Correlation must be strictly between -1 and 1"));
    }
    Ok(r.atanh())
}

/// SE on the Fisher z scale from a CI for r.
pub fn se_fisher_z_from_ci(r_low: f64, r_high: f64) -> PlanResult<f64> {
    let z_low = fisher_z(r_low)?;
    let z_high = fisher_z(r_high)?;
    validate_interval(r_low, r_high)?;
    Ok((z_high - z_low) / (2.0 * z_95()?))
}

// ============================================================================
// Allocation
// ============================================================================

/// Split `total` across groups in proportion to `weights`, assigning the
/// leftover participants to the largest fractional parts.
///
/// When the weights sum to zero every group gets `ceil(total / k)`.
pub fn allocate_by_weights(total: u64, weights: &[f64]) -> PlanResult<Vec<u64>> {
    if weights.is_empty() {
        return Err(PlanError::out_of_range("weights", 0, "At least one group weight is required"));
    }
    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
        return Err(PlanError::out_of_range("weights", w, "Weights must be non-negative"));
    }

    let k = weights.len() as u64;
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Ok(vec![total.div_ceil(k); weights.len()]);
    }

    let raw: Vec<f64> = weights.iter().map(|w| total as f64 * w / sum).collect();
    let mut sizes: Vec<u64> = raw.iter().map(|r| r.floor() as u64).collect();
    let assigned: u64 = sizes.iter().sum();
    let remainder = total.saturating_sub(assigned) as usize;

    let mut order: Vec<usize> = (0..raw.len()).collect();
    order.sort_by(|&i, &j| {
        let fi = raw[i] - raw[i].floor();
        let fj = raw[j] - raw[j].floor();
        fj.total_cmp(&fi).then(j.cmp(&i))
    });
    for &i in order.iter().take(remainder) {
        sizes[i] += 1;
    }
    Ok(sizes)
}

/// Participants-per-predictor stability check for linear regression.
/// Not a power calculation.
pub fn rule_of_thumb_n(per_predictor: u32, predictors: u32) -> u64 {
    u64::from(per_predictor) * u64::from(predictors)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_counts_and_percent() {
        assert!((proportion_from_counts(30, 120).unwrap() - 0.25).abs() < TOL);
        assert!(proportion_from_counts(5, 0).is_err());
        assert!(proportion_from_counts(6, 5).is_err());
        assert!((proportion_from_percent(12.5).unwrap() - 0.125).abs() < TOL);
        assert!(proportion_from_percent(120.0).is_err());
    }

    #[test]
    fn test_odds_ratio_from_table() {
        assert!((odds_ratio_from_2x2(20.0, 10.0, 10.0, 20.0).unwrap() - 4.0).abs() < TOL);
        let err = odds_ratio_from_2x2(20.0, 0.0, 10.0, 20.0).unwrap_err();
        assert_eq!(err.error_code(), "ARITHMETIC_DOMAIN");
        assert_eq!(err.field(), Some("b"));
    }

    #[test]
    fn test_or_round_trip() {
        let p1 = p1_from_or(0.3, 2.0).unwrap();
        assert!((p1 - 0.461_538_461_5).abs() < 1e-9);
        assert!((odds_ratio_from_risks(p1, 0.3).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rr_or_conversions() {
        let or = rr_to_or(1.5, 0.2).unwrap();
        // 1.5 * 0.8 / 0.7
        assert!((or - 1.714_285_714_285_714).abs() < 1e-12);
        assert!((or_to_rr(or, 0.2).unwrap() - 1.5).abs() < 1e-12);
        assert!(rr_to_or(5.0, 0.2).is_err());
        assert!((rr_from_risks(0.3, 0.2).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_p1_from_rr_limits() {
        assert!((p1_from_rr(0.2, 1.5).unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(p1_from_rr(0.5, 2.0).unwrap_err().field(), Some("risk_ratio"));
    }

    #[test]
    fn test_comparator_risks_are_clamped() {
        assert_eq!(p2_from_rr(0.6, 2.0).unwrap(), 1.0);
        assert!((p2_from_arr(0.3, -0.1, EffectDirection::Decrease).unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(p2_from_arr(0.05, 0.1, EffectDirection::Decrease).unwrap(), 0.0);
        assert!((p2_from_rrr(0.4, 0.25, EffectDirection::Decrease).unwrap() - 0.3).abs() < 1e-12);
        assert!((p2_from_rrr(0.4, 0.25, EffectDirection::Increase).unwrap() - 0.5).abs() < 1e-12);
        assert!((p2_from_or(0.3, 2.0).unwrap() - p1_from_or(0.3, 2.0).unwrap()).abs() < TOL);
    }

    #[test]
    fn test_standard_errors() {
        // 1.96 * 2 * 0.5 = 1.96 wide
        let se = se_from_ci(9.02, 10.98).unwrap();
        assert!((se - 0.5).abs() < 1e-4);
        assert_eq!(se_from_ci(2.0, 1.0).unwrap_err().error_code(), "OUT_OF_RANGE");

        let se_log = se_log_from_ci(1.1, 2.9).unwrap();
        assert!((se_log - (2.9f64.ln() - 1.1f64.ln()) / 3.919_927_969).abs() < 1e-6);
        assert_eq!(se_log_from_ci(0.0, 2.0).unwrap_err().error_code(), "ARITHMETIC_DOMAIN");
        assert_eq!(se_log_from_ci(2.0, 1.5).unwrap_err().error_code(), "OUT_OF_RANGE");
    }

    #[test]
    fn test_implied_n() {
        // 0.25 / 0.05² = 100
        assert!((implied_n_from_wald_ci(0.5, 0.05).unwrap() - 100.0).abs() < 1e-9);
        assert!(implied_n_from_wald_ci(0.5, 0.0).is_err());
    }

    #[test]
    fn test_standard_deviations() {
        assert!((sd_from_se(2.0, 49).unwrap() - 14.0).abs() < TOL);
        assert!(sd_from_se(2.0, 1).is_err());
        assert!((sd_from_iqr(13.5).unwrap() - 10.0).abs() < TOL);
        let sd = sd_from_ci(95.0, 105.0, 50).unwrap();
        assert!((sd - 10.0 / 3.919_927_969 * 50f64.sqrt()).abs() < 1e-6);
        assert!((sd_of_differences(10.0, 10.0, 0.5).unwrap() - 10.0).abs() < TOL);
        assert!(sd_of_differences(10.0, 10.0, 1.0).is_err());
        assert!(sd_of_differences(10.0, 10.0, 1.5).is_err());
    }

    #[test]
    fn test_variance_explained() {
        assert!((f2_from_r2(0.2).unwrap() - 0.25).abs() < TOL);
        assert!((f_from_eta2(0.2).unwrap() - 0.5).abs() < TOL);
        assert!(f2_from_r2(1.0).is_err());
        // means 10, 12, 14: population variance 8/3
        let f = f_from_group_means(&[10.0, 12.0, 14.0], 5.0).unwrap();
        assert!((f - (8.0f64 / 3.0).sqrt() / 5.0).abs() < TOL);
        assert!(f_from_group_means(&[3.0, 3.0], 1.0).is_err());
        assert!((r_from_r2(0.09, true).unwrap() + 0.3).abs() < TOL);
    }

    #[test]
    fn test_fisher_z() {
        assert!((fisher_z(0.3).unwrap() - 0.309_519_604_203_112).abs() < 1e-12);
        assert!(fisher_z(1.0).is_err());
        assert!(se_fisher_z_from_ci(0.1, 0.5).unwrap() > 0.0);
        assert!(se_fisher_z_from_ci(0.5, 0.1).is_err());
    }

    #[test]
    fn test_allocate_by_weights() {
        // ties go to the later group
        assert_eq!(allocate_by_weights(10, &[1.0, 1.0, 1.0]).unwrap(), vec![3, 3, 4]);
        assert_eq!(allocate_by_weights(100, &[2.0, 1.0, 1.0]).unwrap(), vec![50, 25, 25]);
        assert_eq!(allocate_by_weights(10, &[0.0, 0.0, 0.0]).unwrap(), vec![4, 4, 4]);
        let sizes = allocate_by_weights(157, &[0.5, 0.3, 0.2]).unwrap();
        assert_eq!(sizes.iter().sum::<u64>(), 157);
        assert!(allocate_by_weights(10, &[]).is_err());
        assert!(allocate_by_weights(10, &[1.0, -1.0]).is_err());
    }

    #[test]
    fn test_rule_of_thumb() {
        assert_eq!(rule_of_thumb_n(15, 6), 90);
    }
}
