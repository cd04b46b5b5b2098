//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages by value
//! - compared in tests (idempotence of a run)
//! - emitted as a JSON report

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{FitError, PipelineError};

/// The fixed catalog of distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    Normal,
    Gamma,
    Weibull,
    Exponential,
    Beta,
    Lognormal,
    ChiSquare,
    Laplace,
    Cauchy,
    Uniform,
}

impl Family {
    /// Catalog order (also the TUI cycling order).
    pub const ALL: [Family; 10] = [
        Family::Normal,
        Family::Gamma,
        Family::Weibull,
        Family::Exponential,
        Family::Beta,
        Family::Lognormal,
        Family::ChiSquare,
        Family::Laplace,
        Family::Cauchy,
        Family::Uniform,
    ];

    /// Human-readable label.
    pub fn display_name(self) -> &'static str {
        match self {
            Family::Normal => "Normal",
            Family::Gamma => "Gamma",
            Family::Weibull => "Weibull",
            Family::Exponential => "Exponential",
            Family::Beta => "Beta",
            Family::Lognormal => "Lognormal",
            Family::ChiSquare => "Chi-square",
            Family::Laplace => "Laplace",
            Family::Cauchy => "Cauchy",
            Family::Uniform => "Uniform",
        }
    }

    /// Role of each parameter, in order.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            Family::Normal => &["mean", "std_dev"],
            Family::Gamma => &["shape", "scale"],
            Family::Weibull => &["shape", "scale"],
            Family::Exponential => &["rate"],
            Family::Beta => &["alpha", "beta"],
            Family::Lognormal => &["mu", "sigma"],
            Family::ChiSquare => &["dof"],
            Family::Laplace => &["location", "scale"],
            Family::Cauchy => &["location", "scale"],
            Family::Uniform => &["min", "max"],
        }
    }

    /// Number of parameters.
    pub fn arity(self) -> usize {
        self.param_names().len()
    }

    pub fn next(self) -> Family {
        let idx = self.index();
        Family::ALL[(idx + 1) % Family::ALL.len()]
    }

    pub fn prev(self) -> Family {
        let idx = self.index();
        Family::ALL[(idx + Family::ALL.len() - 1) % Family::ALL.len()]
    }

    fn index(self) -> usize {
        Family::ALL.iter().position(|&f| f == self).unwrap_or(0)
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A validated one-dimensional sample: finite values, at least two of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Minimum number of observations accepted by the pipeline.
    pub const MIN_LEN: usize = 2;

    pub fn new(values: Vec<f64>) -> Result<Self, PipelineError> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(PipelineError::Parse {
                token: bad.to_string(),
            });
        }
        if values.len() < Self::MIN_LEN {
            return Err(PipelineError::InsufficientData { found: values.len() });
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: a `Sample` holds at least [`Sample::MIN_LEN`] values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Parameters for one family; `values.len()` always equals `family.arity()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedParams {
    family: Family,
    values: Vec<f64>,
}

impl FittedParams {
    /// Build a parameter tuple, checking its arity against the family.
    pub fn new(family: Family, values: Vec<f64>) -> Result<Self, FitError> {
        if values.len() != family.arity() {
            return Err(FitError::InvalidParameters {
                family,
                reason: format!("expected {} parameters, got {}", family.arity(), values.len()),
            });
        }
        Ok(Self { family, values })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(param_i label, role, value)` rows for the parameter table.
    pub fn rows(&self) -> Vec<(String, &'static str, f64)> {
        self.family
            .param_names()
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(i, (role, &v))| (format!("param_{}", i + 1), *role, v))
            .collect()
    }
}

/// Where the sample comes from for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Free text: numbers separated by commas and/or whitespace.
    Text(String),
    /// One column of a CSV file with a header row. `None` means the first column.
    Csv { path: PathBuf, column: Option<String> },
}

impl DataSource {
    /// Resolve the CLI/TUI inputs: a file takes precedence over text.
    pub fn resolve(text: Option<String>, file: Option<PathBuf>, column: Option<String>) -> Option<Self> {
        match (file, text) {
            (Some(path), _) => Some(DataSource::Csv { path, column }),
            (None, Some(text)) => Some(DataSource::Text(text)),
            (None, None) => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Text(_) => "text input".to_string(),
            DataSource::Csv { path, column } => format!(
                "{} [{}]",
                path.display(),
                column.as_deref().unwrap_or("first column")
            ),
        }
    }
}

/// Evaluation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Number of histogram bins.
    pub bins: usize,
    /// Number of density evaluation points over `[min, max]`.
    pub grid_points: usize,
}

impl EvalConfig {
    pub const DEFAULT_BINS: usize = 20;
    pub const DEFAULT_GRID_POINTS: usize = 500;
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            bins: Self::DEFAULT_BINS,
            grid_points: Self::DEFAULT_GRID_POINTS,
        }
    }
}

/// A density-normalized histogram: `sum(heights[i] * width(i)) == 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` monotonically increasing edges.
    pub edges: Vec<f64>,
    /// `bins` normalized heights.
    pub heights: Vec<f64>,
}

impl Histogram {
    pub fn bins(&self) -> usize {
        self.heights.len()
    }

    /// Midpoints of adjacent edges.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Total area under the histogram (1 for a non-empty sample).
    pub fn area(&self) -> f64 {
        self.heights.iter().zip(self.widths()).map(|(h, w)| h * w).sum()
    }
}

/// Everything derived from `(Sample, FittedParams)` for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Evenly spaced evaluation points over `[min, max]`.
    pub grid: Vec<f64>,
    /// Density at each grid point.
    pub density: Vec<f64>,
    pub histogram: Histogram,
    /// Histogram bin centers.
    pub centers: Vec<f64>,
    /// Density linearly interpolated at each bin center.
    pub interpolated: Vec<f64>,
    /// Mean of `|height - interpolated|` over all bins.
    pub mae: f64,
    /// Max of `|height - interpolated|` over all bins.
    pub max_error: f64,
}

impl EvaluationResult {
    /// `(x, density)` pairs for plotting.
    pub fn curve(&self) -> Vec<(f64, f64)> {
        self.grid.iter().copied().zip(self.density.iter().copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_ten_families_with_distinct_names() {
        let mut names: Vec<&str> = Family::ALL.iter().map(|f| f.display_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn family_cycles_through_catalog() {
        let mut f = Family::Normal;
        for _ in 0..Family::ALL.len() {
            f = f.next();
        }
        assert_eq!(f, Family::Normal);
        assert_eq!(Family::Normal.prev(), Family::Uniform);
    }

    #[test]
    fn chi_square_cli_name_is_kebab_case() {
        let value = Family::ChiSquare.to_possible_value().unwrap();
        assert_eq!(value.get_name(), "chi-square");
    }

    #[test]
    fn sample_rejects_short_input() {
        assert_eq!(
            Sample::new(vec![1.0]),
            Err(PipelineError::InsufficientData { found: 1 })
        );
        assert_eq!(
            Sample::new(vec![]),
            Err(PipelineError::InsufficientData { found: 0 })
        );
    }

    #[test]
    fn sample_rejects_non_finite() {
        assert!(matches!(
            Sample::new(vec![1.0, f64::NAN, 2.0]),
            Err(PipelineError::Parse { .. })
        ));
    }

    #[test]
    fn fitted_params_checks_arity() {
        assert!(FittedParams::new(Family::Normal, vec![0.0, 1.0]).is_ok());
        assert!(matches!(
            FittedParams::new(Family::Normal, vec![0.0]),
            Err(FitError::InvalidParameters { family: Family::Normal, .. })
        ));
        assert!(FittedParams::new(Family::Exponential, vec![1.0]).is_ok());
    }

    #[test]
    fn file_source_takes_precedence() {
        let src = DataSource::resolve(
            Some("1 2 3".to_string()),
            Some(PathBuf::from("data.csv")),
            Some("value".to_string()),
        );
        assert_eq!(
            src,
            Some(DataSource::Csv {
                path: PathBuf::from("data.csv"),
                column: Some("value".to_string())
            })
        );
        assert_eq!(DataSource::resolve(None, None, None), None);
    }
}
