use crate::errors::{PlanError, PlanResult};

/// Hard stop for both the bracketing and the bisection loops
const MAX_ITERATIONS: u32 = 400;

/// Given a monotonically non-decreasing function f(x) and a lower bound,
/// finds x to the right of the lower bound with f(x) = target.
///
/// The upper bound is grown by doubling until it brackets the target, then
/// the bracket is bisected until its width is below `tol` relative to the
/// upper end (absolute below 1). Errors from `f` are propagated as-is.
pub fn root_find_monotonic<F>(f: F, lower_bound: f64, target: f64, tol: f64) -> PlanResult<f64>
where
    F: Fn(f64) -> PlanResult<f64>,
{
    if f(lower_bound)? >= target {
        return Ok(lower_bound);
    }

    let mut lower = lower_bound;
    let mut upper = lower_bound;
    let mut iterations = 0;
    while f(upper)? < target {
        lower = upper;
        upper = upper * 2.0 + 1.0; // in case lower_bound is zero
        iterations += 1;
        if iterations >= MAX_ITERATIONS || !upper.is_finite() {
            return Err(PlanError::internal(format!(
                "root find could not bracket target {target}"
            )));
        }
    }

    iterations = 0;
    while upper - lower > tol * upper.max(1.0) {
        let mid = 0.5 * (lower + upper);
        if f(mid)? < target {
            lower = mid;
        } else {
            upper = mid;
        }
        iterations += 1;
        if iterations >= MAX_ITERATIONS {
            break;
        }
    }
    Ok(0.5 * (lower + upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_linear_root_find() {
        let res = root_find_monotonic(|x| Ok(x), 0.0, 3.0, 1e-9).expect("linear root find");
        assert!((res - 3.0).abs() < 1e-6);
    }

    #[test]
    fn basic_quadratic_root_find() {
        let res = root_find_monotonic(|x| Ok(x * x), 0.0, 9.0, 1e-9).expect("quadratic root find");
        assert!((res - 3.0).abs() < 1e-6);
    }

    #[test]
    fn target_already_met_at_lower_bound() {
        let res = root_find_monotonic(|x| Ok(x + 10.0), 0.0, 5.0, 1e-9).unwrap();
        assert_eq!(res, 0.0);
    }

    #[test]
    fn unreachable_target_fails() {
        let res = root_find_monotonic(|x: f64| Ok(x.min(1.0)), 0.0, 2.0, 1e-9);
        assert!(res.is_err());
    }

    #[test]
    fn inner_error_propagates() {
        let res = root_find_monotonic(|_| Err(PlanError::internal("boom")), 0.0, 1.0, 1e-9);
        assert_eq!(res, Err(PlanError::internal("boom")));
    }
}
