//! Summary statistics shared by the estimators.
//!
//! Means and standard deviations are delegated to `statrs`; order statistics use
//! linear interpolation between closest ranks on a sorted copy.

use statrs::statistics::Statistics;

/// Arithmetic mean (NaN for empty input).
pub fn mean(values: &[f64]) -> f64 {
    Statistics::mean(values)
}

/// Population standard deviation (divides by `n`), the Normal MLE of `σ`.
pub fn population_std_dev(values: &[f64]) -> f64 {
    Statistics::population_std_dev(values)
}

/// Mean of `ln(x)`; callers ensure `x > 0`.
pub fn mean_ln(values: &[f64]) -> f64 {
    values.iter().map(|x| x.ln()).sum::<f64>() / values.len() as f64
}

/// Sorted copy of `values` (NaN-free input assumed).
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Quantile `p ∈ [0, 1]` of already sorted values, linear between closest ranks.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

pub fn median(values: &[f64]) -> f64 {
    quantile_sorted(&sorted(values), 0.5)
}

/// Mean absolute deviation around `center`.
pub fn mean_abs_deviation(values: &[f64], center: f64) -> f64 {
    values.iter().map(|x| (x - center).abs()).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_std_dev_divides_by_n() {
        let data = [1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 5.0];
        assert!((mean(&data) - 3.0).abs() < 1e-12);
        assert!((population_std_dev(&data) - (12.0_f64 / 9.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn quartiles_interpolate() {
        let s = sorted(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(quantile_sorted(&s, 0.25), 2.0);
        assert_eq!(quantile_sorted(&s, 0.75), 4.0);
        assert_eq!(quantile_sorted(&s, 0.0), 1.0);
        assert_eq!(quantile_sorted(&s, 1.0), 5.0);
    }

    #[test]
    fn mean_abs_deviation_about_median() {
        let data = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert!((mean_abs_deviation(&data, 3.0) - (2.0 + 1.0 + 0.0 + 1.0 + 97.0) / 5.0).abs() < 1e-12);
    }
}
