//! Formatted terminal output and the JSON report.
//!
//! We keep formatting code in one place so:
//! - the fitting/evaluation code stays clean and testable
//! - output changes are localized (the CLI and TUI share these strings)

use serde::Serialize;

use crate::domain::{EvaluationResult, Family, FittedParams, Histogram, Sample};
use crate::fit::ManualControls;

/// Marker appended to locked sliders.
pub const LOCKED_MARKER: &str = "(locked: inverted bounds)";

/// Serializable summary of one run (`dfit fit --format json`).
#[derive(Debug, Clone, Serialize)]
pub struct FitReport<'a> {
    pub family: Family,
    pub source: String,
    pub n: usize,
    /// Maximum-likelihood estimates.
    pub fitted: &'a [f64],
    /// Parameters actually evaluated (after manual overrides).
    pub params: Vec<ParamRow>,
    pub histogram: &'a Histogram,
    pub mae: f64,
    pub max_error: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamRow {
    pub name: String,
    pub role: &'static str,
    pub value: f64,
}

impl<'a> FitReport<'a> {
    pub fn new(
        source: String,
        sample: &Sample,
        fitted: &'a FittedParams,
        params: &FittedParams,
        eval: &'a EvaluationResult,
    ) -> Self {
        Self {
            family: params.family(),
            source,
            n: sample.len(),
            fitted: fitted.values(),
            params: params
                .rows()
                .into_iter()
                .map(|(name, role, value)| ParamRow { name, role, value })
                .collect(),
            histogram: &eval.histogram,
            mae: eval.mae,
            max_error: eval.max_error,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Header block: data source and sample summary.
pub fn format_run_summary(source: &str, sample: &Sample, family: Family) -> String {
    let mut out = String::new();
    out.push_str("=== dfit - Distribution Fit ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Sample: n={} | range=[{}, {}]\n",
        sample.len(),
        fmt_num(sample.min()),
        fmt_num(sample.max())
    ));
    out.push_str(&format!("Distribution: {}\n", family.display_name()));
    out
}

/// The parameter table (`param_i`, role, value).
pub fn format_param_table(params: &FittedParams) -> String {
    let mut out = String::new();
    out.push_str(&format!("Parameters ({}):\n", params.family()));
    out.push_str(format!("{:<10} {:<10} {:>14}", "param", "role", "value").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<10} {:-<14}", "", "", "").trim_end());
    out.push('\n');
    for (name, role, value) in params.rows() {
        out.push_str(format!("{name:<10} {role:<10} {value:>14.6}").trim_end());
        out.push('\n');
    }
    out
}

/// Slider state, one line per parameter.
pub fn format_controls(controls: &ManualControls) -> String {
    let mut out = String::new();
    out.push_str("Manual parameters:\n");
    for s in controls.sliders() {
        let mut line = format!(
            "- {}: {:.3} in [{:.3}, {:.3}]",
            s.label(),
            s.value(),
            s.lower(),
            s.upper()
        );
        if s.is_inverted() {
            line.push(' ');
            line.push_str(LOCKED_MARKER);
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn format_metrics(eval: &EvaluationResult) -> String {
    format!(
        "Mean Absolute Error (MAE): {:.5}\nMaximum Error: {:.5}\n",
        eval.mae, eval.max_error
    )
}

/// `dfit dists` listing.
pub fn format_catalog() -> String {
    let mut out = String::new();
    out.push_str(format!("{:<14} {:<14} {}", "name", "display", "parameters").trim_end());
    out.push('\n');
    for family in Family::ALL {
        let cli_name = clap::ValueEnum::to_possible_value(&family)
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<14} {:<14} {}\n",
            cli_name,
            family.display_name(),
            family.param_names().join(", ")
        ));
    }
    out
}

/// Compact numeric formatting for axis labels and summaries.
pub fn fmt_num(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && (a >= 1e5 || a < 1e-3) {
        format!("{v:.3e}")
    } else {
        format!("{v:.3}")
    }
}
