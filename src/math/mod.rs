//! Mathematical utilities: evaluation grids, histogram binning, special functions
//! and summary statistics used by the estimators.

pub mod grid;
pub mod histogram;
pub mod special;
pub mod summary;

pub use grid::*;
pub use histogram::*;
pub use special::*;
pub use summary::*;
