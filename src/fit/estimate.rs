//! Maximum-likelihood estimation for each family.
//!
//! Every estimator is deterministic: fixed starting points, fixed iteration caps and
//! fixed tolerances. Closed forms are used where the MLE has one; otherwise:
//!
//! - Gamma shape: root of `ln k - ψ(k) = ln(mean) - mean(ln x)` (Minka's start)
//! - Weibull shape: root of the profile score (Lawless 2003), on data scaled to `(0, 1]`
//! - Beta: Newton on the two digamma score equations, 2x2 solve via nalgebra
//! - Chi-square: `k = 2 ψ⁻¹(mean(ln x) - ln 2)`
//! - Cauchy: EM for a Student-t with one degree of freedom
//!
//! Both one-dimensional roots are of strictly decreasing functions, so they share a
//! Newton solver safeguarded by bisection.

use nalgebra::{Matrix2, Vector2};

use crate::domain::{Family, FittedParams, Sample};
use crate::error::FitError;
use crate::math::{
    digamma, inv_digamma, mean, mean_abs_deviation, mean_ln, median, population_std_dev,
    quantile_sorted, sorted, trigamma,
};
use crate::models::Density;

/// Iteration cap for Newton-type solvers.
const MAX_ITER: usize = 200;

/// Iteration cap for the (linearly convergent) Cauchy EM.
const EM_MAX_ITER: usize = 10_000;

/// Doubling/halving steps allowed while bracketing a root.
const MAX_BRACKET: usize = 200;

/// Relative convergence tolerance.
const TOL: f64 = 1e-10;

/// Fit `family` to `sample` by maximum likelihood.
///
/// The returned parameters always have `family.arity()` entries and always build a
/// valid [`Density`].
pub fn estimate(sample: &Sample, family: Family) -> Result<FittedParams, FitError> {
    let x = sample.values();
    let values = match family {
        Family::Normal => fit_normal(x)?,
        Family::Gamma => fit_gamma(x)?,
        Family::Weibull => fit_weibull(x)?,
        Family::Exponential => fit_exponential(x)?,
        Family::Beta => fit_beta(x)?,
        Family::Lognormal => fit_lognormal(x)?,
        Family::ChiSquare => fit_chi_square(x)?,
        Family::Laplace => fit_laplace(x)?,
        Family::Cauchy => fit_cauchy(x)?,
        Family::Uniform => fit_uniform(x)?,
    };

    let params = FittedParams::new(family, values)?;

    // A fit is only usable if its density can be built.
    Density::from_params(&params)?;

    tracing::info!(family = %family, params = ?params.values(), n = sample.len(), "fitted");
    Ok(params)
}

fn fit_normal(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let sd = population_std_dev(x);
    if !(sd > 0.0) || all_equal(x) {
        return Err(degenerate(Family::Normal, "zero variance"));
    }
    Ok(vec![mean(x), sd])
}

fn fit_gamma(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let family = Family::Gamma;
    require(family, x, |v| v > 0.0, "strictly positive values")?;

    let m = mean(x);
    let s = m.ln() - mean_ln(x);
    // Rounding can leave `s` a few ulps above zero for constant input.
    if !(s > 0.0) || all_equal(x) {
        return Err(degenerate(family, "zero variance"));
    }

    let start = (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s);
    let shape = decreasing_root(family, start, |k| {
        (k.ln() - digamma(k) - s, 1.0 / k - trigamma(k))
    })?;

    Ok(vec![shape, m / shape])
}

fn fit_weibull(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let family = Family::Weibull;
    require(family, x, |v| v > 0.0, "strictly positive values")?;

    if all_equal(x) {
        return Err(degenerate(family, "all values are equal"));
    }
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Scale to (0, 1] so that u^β stays representable for large shapes.
    let ln_u: Vec<f64> = x.iter().map(|v| (v / max).ln()).collect();
    let n = ln_u.len() as f64;
    let sum_ln_u: f64 = ln_u.iter().sum();

    let power_sums = |beta: f64| {
        let (mut s0, mut s1, mut s2) = (0.0, 0.0, 0.0);
        for &lu in &ln_u {
            let u_beta = (beta * lu).exp();
            s0 += u_beta;
            s1 += u_beta * lu;
            s2 += u_beta * lu * lu;
        }
        (s0, s1, s2)
    };

    let shape = decreasing_root(family, 1.2, |beta| {
        let (s0, s1, s2) = power_sums(beta);
        let f = n / beta + sum_ln_u - n * s1 / s0;
        let df = -n / (beta * beta) - n * (s2 * s0 - s1 * s1) / (s0 * s0);
        (f, df)
    })?;

    let (s0, _, _) = power_sums(shape);
    let scale = max * (s0 / n).powf(1.0 / shape);
    Ok(vec![shape, scale])
}

fn fit_exponential(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let family = Family::Exponential;
    require(family, x, |v| v >= 0.0, "non-negative values")?;
    let m = mean(x);
    if !(m > 0.0) {
        return Err(degenerate(family, "all values are zero"));
    }
    Ok(vec![1.0 / m])
}

fn fit_beta(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let family = Family::Beta;
    require(family, x, |v| v > 0.0 && v < 1.0, "values strictly between 0 and 1")?;

    let m = mean(x);
    let var = population_std_dev(x).powi(2);
    if !(var > 0.0) || all_equal(x) {
        return Err(degenerate(family, "zero variance"));
    }

    // Method-of-moments start.
    let common = (m * (1.0 - m) / var - 1.0).max(f64::EPSILON);
    let mut theta = Vector2::new(m * common, (1.0 - m) * common);

    let ln_x = mean_ln(x);
    let ln_1mx = x.iter().map(|v| (1.0 - v).ln()).sum::<f64>() / x.len() as f64;

    for iter in 0..MAX_ITER {
        let (a, b) = (theta[0], theta[1]);
        let psi_ab = digamma(a + b);
        let tri_ab = trigamma(a + b);

        let g = Vector2::new(
            digamma(a) - psi_ab - ln_x,
            digamma(b) - psi_ab - ln_1mx,
        );
        let jac = Matrix2::new(
            trigamma(a) - tri_ab,
            -tri_ab,
            -tri_ab,
            trigamma(b) - tri_ab,
        );
        let inv = jac
            .try_inverse()
            .ok_or_else(|| degenerate(family, "singular information matrix"))?;

        let mut step = inv * g;
        let mut next = theta - step;
        let mut halvings = 0;
        while next.iter().any(|v| !(*v > 0.0)) {
            halvings += 1;
            if halvings > MAX_BRACKET {
                return Err(FitError::NoConvergence { family, iterations: iter + 1 });
            }
            step *= 0.5;
            next = theta - step;
        }

        let converged = step
            .iter()
            .zip(next.iter())
            .all(|(d, v)| d.abs() <= TOL * v.abs());
        theta = next;
        if converged {
            tracing::debug!(family = %family, iterations = iter + 1, "newton converged");
            return Ok(vec![theta[0], theta[1]]);
        }
    }

    Err(FitError::NoConvergence { family, iterations: MAX_ITER })
}

fn fit_lognormal(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let family = Family::Lognormal;
    require(family, x, |v| v > 0.0, "strictly positive values")?;
    let logs: Vec<f64> = x.iter().map(|v| v.ln()).collect();
    let sigma = population_std_dev(&logs);
    if !(sigma > 0.0) || all_equal(x) {
        return Err(degenerate(family, "zero variance"));
    }
    Ok(vec![mean(&logs), sigma])
}

fn fit_chi_square(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let family = Family::ChiSquare;
    require(family, x, |v| v > 0.0, "strictly positive values")?;
    let dof = 2.0 * inv_digamma(mean_ln(x) - std::f64::consts::LN_2);
    if !(dof.is_finite() && dof > 0.0) {
        return Err(degenerate(family, "no positive degrees of freedom solve the score equation"));
    }
    Ok(vec![dof])
}

fn fit_laplace(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let location = median(x);
    let scale = mean_abs_deviation(x, location);
    if !(scale > 0.0) {
        return Err(degenerate(Family::Laplace, "zero spread"));
    }
    Ok(vec![location, scale])
}

fn fit_cauchy(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let family = Family::Cauchy;
    let s = sorted(x);
    let mut location = quantile_sorted(&s, 0.5);
    let mut scale = (quantile_sorted(&s, 0.75) - quantile_sorted(&s, 0.25)) / 2.0;
    if !(scale > 0.0) {
        scale = mean_abs_deviation(x, location);
    }
    if !(scale > 0.0) {
        return Err(degenerate(family, "zero spread"));
    }

    let n = x.len() as f64;
    for iter in 0..EM_MAX_ITER {
        // E-step: latent precision weights of the t(1) scale mixture.
        let weights: Vec<f64> = x
            .iter()
            .map(|v| {
                let z = (v - location) / scale;
                1.0 / (1.0 + z * z)
            })
            .collect();

        // M-step.
        let w_sum: f64 = weights.iter().sum();
        let next_location = weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() / w_sum;
        let next_scale = (2.0
            * weights
                .iter()
                .zip(x)
                .map(|(w, v)| w * (v - next_location).powi(2))
                .sum::<f64>()
            / n)
            .sqrt();

        if !(next_scale > 0.0 && next_location.is_finite()) {
            return Err(degenerate(family, "scale collapsed to zero"));
        }

        let converged = (next_location - location).abs() <= TOL * (location.abs() + next_scale)
            && (next_scale - scale).abs() <= TOL * next_scale;
        location = next_location;
        scale = next_scale;
        if converged {
            tracing::debug!(family = %family, iterations = iter + 1, "em converged");
            return Ok(vec![location, scale]);
        }
    }

    Err(FitError::NoConvergence { family, iterations: EM_MAX_ITER })
}

fn fit_uniform(x: &[f64]) -> Result<Vec<f64>, FitError> {
    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max > min) {
        return Err(degenerate(Family::Uniform, "all values are equal"));
    }
    Ok(vec![min, max])
}

/// Root of a strictly decreasing `f` on `(0, ∞)`.
///
/// `f` returns `(value, derivative)`. The root is first bracketed by halving/doubling
/// `start`; Newton steps that leave the bracket are replaced by bisection.
fn decreasing_root(
    family: Family,
    start: f64,
    f: impl Fn(f64) -> (f64, f64),
) -> Result<f64, FitError> {
    let no_convergence = |iterations| FitError::NoConvergence { family, iterations };

    let mut lo = start;
    let mut hi = start;
    let mut steps = 0;
    while f(lo).0 < 0.0 {
        lo /= 2.0;
        steps += 1;
        if steps > MAX_BRACKET {
            return Err(no_convergence(steps));
        }
    }
    while f(hi).0 > 0.0 {
        hi *= 2.0;
        steps += 1;
        if steps > MAX_BRACKET {
            return Err(no_convergence(steps));
        }
    }

    let mut x = start;
    for iter in 0..MAX_ITER {
        let (fx, dfx) = f(x);
        if fx == 0.0 {
            return Ok(x);
        }
        if fx > 0.0 {
            lo = x;
        } else {
            hi = x;
        }

        let mut next = x - fx / dfx;
        if !(next > lo && next < hi) {
            next = 0.5 * (lo + hi);
        }

        if (next - x).abs() <= TOL * next || (hi - lo) <= TOL * lo {
            tracing::debug!(family = %family, iterations = iter + 1, root = next, "newton converged");
            return Ok(next);
        }
        x = next;
    }

    Err(no_convergence(MAX_ITER))
}

fn require(
    family: Family,
    x: &[f64],
    in_support: impl Fn(f64) -> bool,
    support: &'static str,
) -> Result<(), FitError> {
    if x.iter().all(|&v| in_support(v)) {
        Ok(())
    } else {
        Err(FitError::OutOfSupport { family, support })
    }
}

fn all_equal(x: &[f64]) -> bool {
    x.windows(2).all(|w| w[0] == w[1])
}

fn degenerate(family: Family, reason: &'static str) -> FitError {
    FitError::Degenerate { family, reason }
}
