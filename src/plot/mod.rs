//! Chart rendering.
//!
//! - fixed-size text chart for `dfit fit` (`ascii`)
//! - Plotters chart shared by the TUI and `--svg` output (`chart`)

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::*;
