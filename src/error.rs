//! Error types.
//!
//! Two layers:
//!
//! - [`PipelineError`] / [`FitError`] / [`OverrideError`]: what can go wrong inside a single
//!   acquire -> fit -> evaluate run. Front-ends render these inline.
//! - [`AppError`]: process-level failure (message + exit code) returned from `app::run`.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Family;

/// Failure of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Neither text nor a file was provided.
    #[error("No valid data yet: enter numbers or load a CSV file.")]
    NoData,

    /// The text input contained a token that is not a finite number.
    ///
    /// The token is kept for logging; the message intentionally stays generic.
    #[error("No sample available: please enter at least 2 valid numbers or load a CSV file.")]
    Parse { token: String },

    /// Fewer than two usable values.
    #[error("Insufficient data: please enter at least 2 valid numbers or load a CSV file (found {found}).")]
    InsufficientData { found: usize },

    #[error("Failed to read CSV '{}': {reason}", path.display())]
    Csv { path: PathBuf, reason: String },

    #[error("Column '{column}' not found. Available columns: {available}")]
    UnknownColumn { column: String, available: String },

    #[error("Fitting failed: {0}")]
    Fit(#[from] FitError),

    #[error(transparent)]
    Override(#[from] OverrideError),

    #[error("Rendering failed: {0}")]
    Render(String),
}

/// Failure of a maximum-likelihood fit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("{family} requires data with {support}")]
    OutOfSupport { family: Family, support: &'static str },

    #[error("{family}: degenerate sample ({reason})")]
    Degenerate { family: Family, reason: &'static str },

    #[error("{family}: estimator did not converge after {iterations} iterations")]
    NoConvergence { family: Family, iterations: usize },

    #[error("{family}: invalid parameters ({reason})")]
    InvalidParameters { family: Family, reason: String },
}

/// Rejected manual parameter adjustment. Parameter indices are 1-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverrideError {
    #[error("Parameter {index} does not exist ({family} has {arity} parameters)")]
    UnknownParameter { family: Family, index: usize, arity: usize },

    #[error("Parameter {index} is locked: its bounds are inverted ({lower:.3} > {upper:.3})")]
    Inverted { index: usize, lower: f64, upper: f64 },

    #[error("Parameter {index} = {value} is outside [{lower:.3}, {upper:.3}]")]
    OutOfRange { index: usize, value: f64, lower: f64, upper: f64 },

    #[error("Parameter {index} must be a finite number")]
    NotFinite { index: usize },

    #[error("Manual parameters are not valid for {family}: {reason}")]
    InvalidParameters { family: Family, reason: String },

    #[error("Manual controls belong to {controls}, not {active}")]
    FamilyMismatch { controls: Family, active: Family },

    #[error("Invalid parameter override '{0}': expected INDEX=VALUE")]
    Syntax(String),
}

impl PipelineError {
    /// Exit code used when this error terminates the process.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Fit(_) => 3,
            PipelineError::Render(_) => 4,
            _ => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_stage() {
        assert_eq!(PipelineError::NoData.exit_code(), 2);
        assert_eq!(PipelineError::InsufficientData { found: 1 }.exit_code(), 2);
        let fit = FitError::Degenerate { family: Family::Normal, reason: "zero variance" };
        assert_eq!(PipelineError::from(fit).exit_code(), 3);
        assert_eq!(PipelineError::Render("x".to_string()).exit_code(), 4);
    }

    #[test]
    fn parse_error_message_is_generic() {
        let err = PipelineError::Parse { token: "abc".to_string() };
        assert!(!err.to_string().contains("abc"));
    }

    #[test]
    fn fit_error_message_carries_reason() {
        let err = PipelineError::from(FitError::OutOfSupport {
            family: Family::Beta,
            support: "values strictly between 0 and 1",
        });
        assert_eq!(
            err.to_string(),
            "Fitting failed: Beta requires data with values strictly between 0 and 1"
        );
    }
}
