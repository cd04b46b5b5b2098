//! Probability densities for each family.
//!
//! `Density` is built once per run from `(Family, params)` and then evaluated over the
//! whole grid. Construction is where parameter validation happens: anything `statrs`
//! rejects (non-positive scale, `min >= max`, ...) surfaces as `FitError::InvalidParameters`.

use statrs::distribution::{
    Beta, Cauchy, ChiSquared, Continuous, Exp, Gamma, Laplace, LogNormal, Normal, Uniform, Weibull,
};

use crate::domain::{Family, FittedParams};
use crate::error::FitError;

/// A ready-to-evaluate density for one member of a family.
#[derive(Debug, Clone)]
pub enum Density {
    Normal(Normal),
    Gamma(Gamma),
    Weibull(Weibull),
    Exponential(Exp),
    Beta(Beta),
    Lognormal(LogNormal),
    ChiSquare(ChiSquared),
    Laplace(Laplace),
    Cauchy(Cauchy),
    Uniform(Uniform),
}

impl Density {
    /// Build the density for `family` from an ordered parameter slice.
    ///
    /// The slice must follow `family.param_names()`.
    pub fn new(family: Family, params: &[f64]) -> Result<Self, FitError> {
        if params.len() != family.arity() {
            return Err(FitError::InvalidParameters {
                family,
                reason: format!("expected {} parameters, got {}", family.arity(), params.len()),
            });
        }
        if let Some(bad) = params.iter().find(|p| !p.is_finite()) {
            return Err(FitError::InvalidParameters {
                family,
                reason: format!("non-finite parameter {bad}"),
            });
        }

        let invalid = |e: statrs::StatsError| FitError::InvalidParameters {
            family,
            reason: e.to_string(),
        };

        let density = match family {
            Family::Normal => Density::Normal(Normal::new(params[0], params[1]).map_err(invalid)?),
            Family::Gamma => {
                // statrs parameterizes by rate; we expose scale.
                let scale = positive(family, "scale", params[1])?;
                Density::Gamma(Gamma::new(params[0], 1.0 / scale).map_err(invalid)?)
            }
            Family::Weibull => Density::Weibull(Weibull::new(params[0], params[1]).map_err(invalid)?),
            Family::Exponential => Density::Exponential(Exp::new(params[0]).map_err(invalid)?),
            Family::Beta => Density::Beta(Beta::new(params[0], params[1]).map_err(invalid)?),
            Family::Lognormal => {
                Density::Lognormal(LogNormal::new(params[0], params[1]).map_err(invalid)?)
            }
            Family::ChiSquare => Density::ChiSquare(ChiSquared::new(params[0]).map_err(invalid)?),
            Family::Laplace => Density::Laplace(Laplace::new(params[0], params[1]).map_err(invalid)?),
            Family::Cauchy => Density::Cauchy(Cauchy::new(params[0], params[1]).map_err(invalid)?),
            Family::Uniform => Density::Uniform(Uniform::new(params[0], params[1]).map_err(invalid)?),
        };
        Ok(density)
    }

    pub fn from_params(params: &FittedParams) -> Result<Self, FitError> {
        Self::new(params.family(), params.values())
    }

    /// Probability density at `x` (0 outside the support).
    ///
    /// Gamma and Weibull go through the log density; their direct forms overflow for
    /// large shapes.
    pub fn pdf(&self, x: f64) -> f64 {
        match self {
            Density::Normal(d) => d.pdf(x),
            Density::Gamma(d) => d.ln_pdf(x).exp(),
            Density::Weibull(d) => weibull_pdf(d.shape(), d.scale(), x),
            Density::Exponential(d) => d.pdf(x),
            Density::Beta(d) => d.pdf(x),
            Density::Lognormal(d) => d.pdf(x),
            Density::ChiSquare(d) => d.pdf(x),
            Density::Laplace(d) => d.pdf(x),
            Density::Cauchy(d) => d.pdf(x),
            Density::Uniform(d) => d.pdf(x),
        }
    }
}

/// `k/λ (x/λ)^(k-1) exp(-(x/λ)^k)` evaluated in log space.
///
/// statrs' own `ln_pdf` multiplies `x^k` by `λ^-k`, which is `inf * 0` once `k` is large.
fn weibull_pdf(shape: f64, scale: f64, x: f64) -> f64 {
    if x < 0.0 || x.is_infinite() {
        return 0.0;
    }
    if x == 0.0 {
        return match shape.partial_cmp(&1.0) {
            Some(std::cmp::Ordering::Less) => f64::INFINITY,
            Some(std::cmp::Ordering::Equal) => 1.0 / scale,
            _ => 0.0,
        };
    }
    let z = x / scale;
    (shape.ln() - scale.ln() + (shape - 1.0) * z.ln() - z.powf(shape)).exp()
}

fn positive(family: Family, name: &str, value: f64) -> Result<f64, FitError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(FitError::InvalidParameters {
            family,
            reason: format!("{name} must be > 0 (got {value})"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_normal_peak() {
        let d = Density::new(Family::Normal, &[0.0, 1.0]).unwrap();
        let peak = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
        assert!((d.pdf(0.0) - peak).abs() < 1e-12);
    }

    #[test]
    fn gamma_uses_scale_parameter() {
        // shape 1, scale 2 is Exp(rate = 0.5).
        let gamma = Density::new(Family::Gamma, &[1.0, 2.0]).unwrap();
        let exp = Density::new(Family::Exponential, &[0.5]).unwrap();
        for &x in &[0.1, 1.0, 3.0] {
            assert!((gamma.pdf(x) - exp.pdf(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn weibull_matches_closed_form() {
        // shape 2, scale 3 at x = 1.5: (2/3)(0.5) e^-0.25
        let d = Density::new(Family::Weibull, &[2.0, 3.0]).unwrap();
        let expected = 2.0 / 3.0 * 0.5 * (-0.25_f64).exp();
        assert!((d.pdf(1.5) - expected).abs() < 1e-12);
        assert_eq!(d.pdf(-1.0), 0.0);
        assert_eq!(d.pdf(0.0), 0.0);
        let exp_like = Density::new(Family::Weibull, &[1.0, 2.0]).unwrap();
        assert!((exp_like.pdf(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn large_shapes_stay_finite() {
        let weibull = Density::new(Family::Weibull, &[5.0e5, 100.0]).unwrap();
        let at_scale = weibull.pdf(100.0);
        assert!(at_scale.is_finite() && at_scale > 0.0);
        // ln pdf = ln(k / λ) - 1 at x = λ.
        assert!((at_scale.ln() - ((5.0e5_f64 / 100.0).ln() - 1.0)).abs() < 1e-6);

        let gamma = Density::new(Family::Gamma, &[2.0e4, 0.005]).unwrap();
        let at_mean = gamma.pdf(100.0);
        assert!(at_mean.is_finite() && at_mean > 0.0);
    }

    #[test]
    fn uniform_is_flat_inside_support() {
        let d = Density::new(Family::Uniform, &[2.0, 6.0]).unwrap();
        assert!((d.pdf(3.0) - 0.25).abs() < 1e-12);
        assert_eq!(d.pdf(7.0), 0.0);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            Density::new(Family::Normal, &[0.0, -1.0]),
            Err(FitError::InvalidParameters { family: Family::Normal, .. })
        ));
        assert!(Density::new(Family::Gamma, &[2.0, 0.0]).is_err());
        assert!(Density::new(Family::Uniform, &[3.0, 1.0]).is_err());
        assert!(Density::new(Family::Beta, &[1.0]).is_err());
        assert!(Density::new(Family::Cauchy, &[f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn every_family_builds_with_unit_parameters() {
        for family in Family::ALL {
            let params: Vec<f64> = match family {
                Family::Uniform => vec![0.0, 1.0],
                Family::Normal | Family::Laplace | Family::Cauchy => vec![0.0, 1.0],
                Family::Lognormal => vec![0.0, 1.0],
                _ => vec![1.5; family.arity()],
            };
            let d = Density::new(family, &params).unwrap();
            assert!(d.pdf(0.5).is_finite() && d.pdf(0.5) > 0.0, "{family}");
        }
    }
}
