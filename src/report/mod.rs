//! Fit evaluation and formatted output.
//!
//! `evaluate` turns `(Sample, FittedParams)` into everything the front-ends display:
//! the density curve over the sample range, the normalized histogram, and the two
//! histogram-vs-density error metrics.

pub mod format;

pub use format::*;

use crate::domain::{EvalConfig, EvaluationResult, FittedParams, Sample};
use crate::error::PipelineError;
use crate::math::{density_histogram, interp, lin_space};
use crate::models::Density;

/// Evaluate `params` against `sample`.
pub fn evaluate(
    sample: &Sample,
    params: &FittedParams,
    config: &EvalConfig,
) -> Result<EvaluationResult, PipelineError> {
    let density_fn =
        Density::from_params(params).map_err(|e| PipelineError::Render(e.to_string()))?;

    let span = sample.max() - sample.min();
    if !span.is_finite() {
        return Err(PipelineError::Render(format!(
            "sample range [{}, {}] is too wide to evaluate",
            sample.min(),
            sample.max()
        )));
    }

    let grid = lin_space(sample.min(), sample.max(), config.grid_points);
    let mut density = Vec::with_capacity(grid.len());
    for &x in &grid {
        let d = density_fn.pdf(x);
        if !d.is_finite() {
            return Err(PipelineError::Render(format!(
                "non-finite {} density at x = {x}",
                params.family()
            )));
        }
        density.push(d);
    }

    let histogram = density_histogram(sample.values(), config.bins);
    let centers = histogram.centers();
    let interpolated: Vec<f64> = centers.iter().map(|&c| interp(c, &grid, &density)).collect();

    let errors: Vec<f64> = histogram
        .heights
        .iter()
        .zip(&interpolated)
        .map(|(h, d)| (h - d).abs())
        .collect();
    let mae = errors.iter().sum::<f64>() / errors.len() as f64;
    let max_error = errors.iter().copied().fold(0.0, f64::max);

    tracing::debug!(mae, max_error, bins = histogram.bins(), "evaluated fit");

    Ok(EvaluationResult {
        grid,
        density,
        histogram,
        centers,
        interpolated,
        mae,
        max_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Family;

    fn normal_case() -> (Sample, FittedParams) {
        let sample = Sample::new(vec![1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 5.0]).unwrap();
        let params = FittedParams::new(Family::Normal, vec![3.0, (12.0_f64 / 9.0).sqrt()]).unwrap();
        (sample, params)
    }

    #[test]
    fn grid_spans_sample_range() {
        let (sample, params) = normal_case();
        let eval = evaluate(&sample, &params, &EvalConfig::default()).unwrap();
        assert_eq!(eval.grid.len(), 500);
        assert_eq!(eval.grid[0], 1.0);
        assert_eq!(eval.grid[499], 5.0);
        assert_eq!(eval.density.len(), 500);
        assert_eq!(eval.centers.len(), 20);
        assert_eq!(eval.interpolated.len(), 20);
    }

    #[test]
    fn metrics_are_consistent() {
        let (sample, params) = normal_case();
        let eval = evaluate(&sample, &params, &EvalConfig::default()).unwrap();
        assert!(eval.mae >= 0.0);
        assert!(eval.max_error >= eval.mae);
        assert!((eval.histogram.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let (sample, params) = normal_case();
        let config = EvalConfig { bins: 7, grid_points: 64 };
        assert_eq!(
            evaluate(&sample, &params, &config).unwrap(),
            evaluate(&sample, &params, &config).unwrap()
        );
    }

    #[test]
    fn invalid_parameters_are_a_render_error() {
        let (sample, _) = normal_case();
        let params = FittedParams::new(Family::Normal, vec![3.0, -1.0]).unwrap();
        let err = evaluate(&sample, &params, &EvalConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Render(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn overflowing_range_is_a_render_error() {
        let sample = Sample::new(vec![-1e308, 1e308]).unwrap();
        let params = FittedParams::new(Family::Uniform, vec![-1e308, 1e308]).unwrap();
        let err = evaluate(&sample, &params, &EvalConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Render(_)));
    }

    #[test]
    fn infinite_density_is_a_render_error() {
        // Gamma with shape < 1 diverges at 0; grid starts at the sample minimum.
        let sample = Sample::new(vec![0.0, 1.0, 2.0]).unwrap();
        let params = FittedParams::new(Family::Gamma, vec![0.5, 1.0]).unwrap();
        let err = evaluate(&sample, &params, &EvalConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Render(_)));
    }
}
