//! Small-sample estimators behind the base score component.
//!
//! Both functions are total: zero-count inputs return a documented default
//! instead of dividing by zero.

use burgerank_core::constants::WILSON_Z;

/// Rating mean shrunk toward a prior.
///
/// `(prior_weight * prior_mean + count * mean) / (prior_weight + count)`.
/// Returns `prior_mean` unmodified when `count == 0`.
pub fn bayesian_mean(prior_mean: f64, prior_weight: f64, count: u64, mean: f64) -> f64 {
    if count == 0 {
        return prior_mean;
    }
    let n = count as f64;
    let denom = prior_weight + n;
    if denom <= 0.0 {
        return mean;
    }
    (prior_weight * prior_mean + n * mean) / denom
}

/// Lower bound of the Wilson score interval (z = 1.96) on
/// `positive / total`, bounded to `[0, 1]`.
///
/// Returns `0.0` when `total == 0`. A `positive` count above `total` is
/// treated as `total`.
pub fn wilson_lower_bound(positive: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let p = (positive.min(total) as f64) / n;
    let z2 = WILSON_Z * WILSON_Z;

    let centre = p + z2 / (2.0 * n);
    let margin = WILSON_Z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt();
    let bound = (centre - margin) / (1.0 + z2 / n);

    bound.clamp(0.0, 1.0)
}
