//! Parameter estimation.
//!
//! Responsibilities:
//!
//! - maximum-likelihood fit per family (deterministic, bounded iterations)
//! - manual slider overrides layered on top of a fit

pub mod estimate;
pub mod manual;

pub use estimate::*;
pub use manual::*;
