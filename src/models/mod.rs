//! Density evaluation for the distribution catalog.
//!
//! Densities are small wrappers around `statrs` distributions so that the fitter,
//! the evaluator and the renderers can stay generic over the family.

pub mod density;

pub use density::*;
