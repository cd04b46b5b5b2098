//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the distribution catalog (`Family`)
//! - the validated input sample (`Sample`) and where it comes from (`DataSource`)
//! - fit and evaluation outputs (`FittedParams`, `Histogram`, `EvaluationResult`)

pub mod types;

pub use types::*;
