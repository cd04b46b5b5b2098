//! Equal-width, density-normalized histograms.
//!
//! Binning follows the usual numerical-library conventions:
//! - bins span the data's own `[min, max]`
//! - every bin is half-open `[a, b)` except the last, which also includes `max`
//! - a zero-width range is widened to `[v - 0.5, v + 0.5]`
//! - heights are `count / (n * width)`, so the bars integrate to 1

use crate::domain::Histogram;

/// Bin `values` into `bins` equal-width bins normalized to unit area.
///
/// Returns an empty histogram for empty input or `bins == 0`. Non-finite values
/// are not expected (callers pass a validated `Sample`).
pub fn density_histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram {
            edges: Vec::new(),
            heights: Vec::new(),
        };
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi == lo {
        lo -= 0.5;
        hi += 0.5;
    }

    let edges = super::lin_space(lo, hi, bins + 1);
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let mut idx = ((v - lo) / width).floor() as usize;
        idx = idx.min(bins - 1);
        // Floating point can put a value just across an edge; settle it against the edges.
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    let n = values.len() as f64;
    let heights = counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&c, w)| c as f64 / (n * (w[1] - w[0])))
        .collect();

    Histogram { edges, heights }
}
