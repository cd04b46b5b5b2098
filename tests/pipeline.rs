//! End-to-end checks of the fit pipeline through the public library API.

use std::path::PathBuf;

use dist_fit::app::pipeline::run;
use dist_fit::domain::{DataSource, EvalConfig, Family};
use dist_fit::error::PipelineError;
use dist_fit::fit::ParamOverride;
use dist_fit::io::acquire;

fn text(s: &str) -> DataSource {
    DataSource::Text(s.to_string())
}

fn write_csv(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dfit-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const DATA: &str = "1 2 2 3 3 3 4 4 5";

#[test]
fn separators_are_interchangeable() {
    for input in ["1,2,3", "1 2 3", "1,\n2 3", " 1 ,\t2,, 3 "] {
        let sample = acquire(&text(input)).unwrap();
        assert_eq!(sample.values(), &[1.0, 2.0, 3.0], "input {input:?}");
    }
}

#[test]
fn one_bad_token_rejects_the_whole_input() {
    let err = acquire(&text("1, a, 3")).unwrap_err();
    assert!(matches!(err, PipelineError::Parse { ref token } if token == "a"));
}

#[test]
fn short_samples_stop_before_fitting() {
    for family in Family::ALL {
        let err = run(&text("5"), family, None, &[], &EvalConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData { found: 1 }), "{family}");
    }
    let err = run(&text("  "), Family::Normal, None, &[], &EvalConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::NoData));
}

#[test]
fn repeated_runs_are_identical() {
    let config = EvalConfig::default();
    for family in [Family::Normal, Family::Gamma, Family::Weibull, Family::Cauchy] {
        let a = run(&text(DATA), family, None, &[], &config).unwrap();
        let b = run(&text(DATA), family, None, &[], &config).unwrap();
        assert_eq!(a.fitted, b.fitted);
        assert_eq!(a.eval, b.eval);
    }
}

#[test]
fn histogram_integrates_to_one() {
    let config = EvalConfig { bins: 7, grid_points: 100 };
    let out = run(&text("0.5 1.7 2.2 2.9 3.1 4.8 5.5 7.25 9"), Family::Gamma, None, &[], &config).unwrap();
    assert_eq!(out.eval.histogram.bins(), 7);
    assert!((out.eval.histogram.area() - 1.0).abs() < 1e-9);
    assert_eq!(out.eval.grid.len(), 100);
}

#[test]
fn slider_at_initial_value_changes_nothing() {
    let config = EvalConfig::default();
    let first = run(&text(DATA), Family::Lognormal, None, &[], &config).unwrap();

    let mut controls = first.controls.clone();
    for i in 0..Family::Lognormal.arity() {
        let slider = controls.slider_mut(i).unwrap();
        let initial = slider.initial();
        slider.set(initial).unwrap();
    }

    let second = run(&text(DATA), Family::Lognormal, Some(&controls), &[], &config).unwrap();
    assert_eq!(second.params, second.fitted);
    assert_eq!(second.eval, first.eval);
}

#[test]
fn normal_fit_on_reference_sample() {
    let out = run(&text(DATA), Family::Normal, None, &[], &EvalConfig::default()).unwrap();
    let p = out.fitted.values();
    assert!((p[0] - 3.0).abs() < 1e-12);
    assert!((p[1] - (12.0_f64 / 9.0).sqrt()).abs() < 1e-12);
    assert!(out.eval.mae >= 0.0);
    assert!(out.eval.max_error >= out.eval.mae);
}

#[test]
fn csv_column_selection_ignores_other_columns() {
    let path = write_csv("ids.csv", "id,value\nA-1,1.5\nB-2,2.5\nC-3,4\nD-4,NA\n");

    let source = DataSource::Csv {
        path: path.clone(),
        column: Some("value".to_string()),
    };
    let out = run(&source, Family::Exponential, None, &[], &EvalConfig::default()).unwrap();
    assert_eq!(out.sample.values(), &[1.5, 2.5, 4.0]);
    assert!((out.fitted.values()[0] - 3.0 / 8.0).abs() < 1e-12);

    let first_column = DataSource::Csv { path, column: None };
    let err = run(&first_column, Family::Normal, None, &[], &EvalConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Csv { .. }));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn switching_family_discards_controls() {
    let config = EvalConfig::default();
    let normal = run(&text(DATA), Family::Normal, None, &[], &config).unwrap();
    let mut controls = normal.controls.clone();
    controls.slider_mut(0).unwrap().nudge(25);

    let gamma = run(&text(DATA), Family::Gamma, Some(&controls), &[], &config).unwrap();
    assert_eq!(gamma.controls.family(), Family::Gamma);
    assert_eq!(gamma.params, gamma.fitted);
}

#[test]
fn inverted_bounds_lock_the_slider() {
    let config = EvalConfig::default();
    let out = run(&text("-60 -50 -40"), Family::Normal, None, &[], &config).unwrap();
    let mut controls = out.controls.clone();
    let slider = controls.slider_mut(0).unwrap();
    assert!(slider.is_inverted());
    slider.nudge(10);
    assert_eq!(slider.value(), slider.initial());

    let again = run(&text("-60 -50 -40"), Family::Normal, Some(&controls), &[], &config).unwrap();
    assert_eq!(again.eval, out.eval);
}

#[test]
fn overrides_outside_slider_range_are_rejected() {
    let overrides: Vec<ParamOverride> = vec!["2=1000".parse().unwrap()];
    let err = run(&text(DATA), Family::Normal, None, &overrides, &EvalConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Override(_)));

    let overrides: Vec<ParamOverride> = vec!["3=1".parse().unwrap()];
    let err = run(&text(DATA), Family::Normal, None, &overrides, &EvalConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Override(_)));
}

#[test]
fn fit_failures_name_the_reason() {
    let err = run(&text("-1 2 3"), Family::Lognormal, None, &[], &EvalConfig::default()).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().starts_with("Fitting failed: "));
}

#[test]
fn override_rejected_by_the_family_is_not_a_fit_failure() {
    // 2=-1 lies within the std_dev slider bounds but is not a valid scale.
    let overrides: Vec<ParamOverride> = vec!["2=-1".parse().unwrap()];
    let err = run(&text(DATA), Family::Normal, None, &overrides, &EvalConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Override(_)), "{err:?}");
    assert_eq!(err.exit_code(), 2);
    assert!(!err.to_string().starts_with("Fitting failed"));
}

#[test]
fn overflowing_sample_range_is_reported_not_panicked() {
    let err = run(&text("-1e308 1e308"), Family::Uniform, None, &[], &EvalConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Render(_)), "{err:?}");
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn tight_weibull_sample_evaluates() {
    let out = run(&text("100 100.0001 100.0002"), Family::Weibull, None, &[], &EvalConfig::default())
        .unwrap();
    assert!(out.fitted.values()[0] > 100.0);
    assert!(out.eval.density.iter().all(|d| d.is_finite() && *d >= 0.0));
    assert!(out.eval.mae.is_finite());
}
