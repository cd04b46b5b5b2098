//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! acquire sample -> MLE fit -> manual overrides -> evaluate
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Nothing is cached between runs; the only state carried across runs is the
//! front-end's `ManualControls`, which is passed in and handed back.

use crate::domain::{DataSource, EvalConfig, EvaluationResult, Family, FittedParams, Sample};
use crate::error::PipelineError;
use crate::fit::{ManualControls, ParamOverride, estimate};
use crate::io::acquire;
use crate::report::evaluate;

/// All computed outputs of a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub sample: Sample,
    /// Maximum-likelihood estimates.
    pub fitted: FittedParams,
    /// Slider state for this fit (reused or freshly seeded).
    pub controls: ManualControls,
    /// Parameters actually evaluated (fit + slider values).
    pub params: FittedParams,
    pub eval: EvaluationResult,
}

/// Execute the full pipeline for one interaction.
///
/// `controls` from a previous run are reused only if they were seeded from exactly
/// this fit; otherwise they are discarded and reseeded. `overrides` are applied on
/// top of the resulting controls.
pub fn run(
    source: &DataSource,
    family: Family,
    controls: Option<&ManualControls>,
    overrides: &[ParamOverride],
    config: &EvalConfig,
) -> Result<RunOutput, PipelineError> {
    let _span = tracing::info_span!("pipeline", family = %family).entered();
    let sample = acquire(source)?;
    run_with_sample(sample, family, controls, overrides, config)
}

/// Same as [`run`], for an already acquired sample.
pub fn run_with_sample(
    sample: Sample,
    family: Family,
    controls: Option<&ManualControls>,
    overrides: &[ParamOverride],
    config: &EvalConfig,
) -> Result<RunOutput, PipelineError> {
    let fitted = estimate(&sample, family)?;

    let mut controls = match controls {
        Some(prev) if prev.matches(&fitted) => prev.clone(),
        Some(prev) => {
            tracing::debug!(
                previous = %prev.family(),
                active = %family,
                "discarding manual controls from a different fit"
            );
            ManualControls::seeded_from(&fitted)
        }
        None => ManualControls::seeded_from(&fitted),
    };

    for o in overrides {
        controls.apply_override(o)?;
    }

    let params = controls.params(&fitted)?;
    let eval = evaluate(&sample, &params, config)?;

    Ok(RunOutput {
        sample,
        fitted,
        controls,
        params,
        eval,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> DataSource {
        DataSource::Text(s.to_string())
    }

    const DATA: &str = "1 2 2 3 3 3 4 4 5";

    #[test]
    fn fresh_run_seeds_controls_from_fit() {
        let out = run(&text(DATA), Family::Normal, None, &[], &EvalConfig::default()).unwrap();
        assert!(out.controls.matches(&out.fitted));
        assert_eq!(out.params, out.fitted);
    }

    #[test]
    fn matching_controls_are_reused() {
        let config = EvalConfig::default();
        let first = run(&text(DATA), Family::Normal, None, &[], &config).unwrap();

        let mut controls = first.controls.clone();
        if let Some(s) = controls.slider_mut(0) {
            s.nudge(50);
        }
        let second = run(&text(DATA), Family::Normal, Some(&controls), &[], &config).unwrap();
        assert_eq!(second.controls, controls);
        assert!((second.params.values()[0] - 3.5).abs() < 1e-9);
        assert_ne!(second.eval, first.eval);
    }

    #[test]
    fn changed_data_reseeds_controls() {
        let config = EvalConfig::default();
        let first = run(&text(DATA), Family::Normal, None, &[], &config).unwrap();
        let mut controls = first.controls.clone();
        if let Some(s) = controls.slider_mut(0) {
            s.nudge(50);
        }
        let other = run(&text("1 2 3 4 10"), Family::Normal, Some(&controls), &[], &config).unwrap();
        assert_eq!(other.params, other.fitted);
    }

    #[test]
    fn overrides_apply_on_top_of_controls() {
        let overrides = ["1=2.5".parse::<ParamOverride>().unwrap()];
        let out = run(&text(DATA), Family::Normal, None, &overrides, &EvalConfig::default()).unwrap();
        assert_eq!(out.params.values()[0], 2.5);
        assert_eq!(out.params.values()[1], out.fitted.values()[1]);
    }

    #[test]
    fn fit_failure_is_reported() {
        let err = run(&text(DATA), Family::Beta, None, &[], &EvalConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Fit(_)));
        assert!(err.to_string().starts_with("Fitting failed: "));
    }
}
