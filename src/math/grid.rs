//! Evaluation grids and piecewise-linear interpolation.

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
///
/// The last point is exactly `max`. With `min == max` every point equals `min`.
/// `steps` of 0 or 1 yields `[]` or `[min]`.
pub fn lin_space(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => return Vec::new(),
        1 => return vec![min],
        _ => {}
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps - 1 {
        out.push(min + step * i as f64);
    }
    out.push(max);
    out
}

/// Linearly interpolate `(xs, ys)` at `x`.
///
/// `xs` must be non-decreasing. Points left of `xs[0]` take `ys[0]`; points right of
/// the last node take the last value. Returns NaN for an empty table or when `x` or a
/// node is NaN.
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 || x.is_nan() || xs[..n].iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }

    // First node strictly greater than x.
    let hi = xs[..n].partition_point(|&v| v <= x);
    if hi == 0 || hi >= n {
        return f64::NAN;
    }
    let lo = hi - 1;
    let (x0, x1) = (xs[lo], xs[hi]);
    let (y0, y1) = (ys[lo], ys[hi]);
    if x1 == x0 {
        return y1;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}
