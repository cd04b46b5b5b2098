//! Input helpers.
//!
//! - text and CSV sample acquisition (`ingest`)

pub mod ingest;

pub use ingest::*;
