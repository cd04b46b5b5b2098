//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - density histogram: `#` bars
//! - fitted density: `*` line (drawn last, on top)
//! - horizontal gridlines at quarter heights: `.`

use crate::domain::{EvaluationResult, Family};
use crate::report::fmt_num;

/// Render the histogram + density chart as text.
pub fn render_ascii_plot(eval: &EvaluationResult, family: Family, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(eval).unwrap_or((0.0, 1.0));
    let y_max = eval
        .histogram
        .heights
        .iter()
        .chain(&eval.density)
        .copied()
        .fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let mut grid = vec![vec![' '; width]; height];

    for k in 1..4 {
        let row = map_y(y_max * k as f64 / 4.0, y_max, height);
        grid[row].fill('.');
    }

    draw_bars(&mut grid, eval, x_min, x_max, y_max);

    let curve = eval.curve();
    let mut prev = None;
    for &(x, y) in &curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(&mut grid, c0, r0, col, row, '*'),
            None => grid[row][col] = '*',
        }
        prev = Some((col, row));
    }

    let mut out = String::new();
    out.push_str(&format!("Distribution Fit: {}\n", family.display_name()));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&format!(
        "Legend: # Data Histogram | * {} Fit\n",
        family.display_name()
    ));
    out.push_str(&format!(
        "x: Value [{}, {}] | y: Density [0, {}]\n",
        fmt_num(x_min),
        fmt_num(x_max),
        fmt_num(y_max)
    ));
    out
}

fn x_range(eval: &EvaluationResult) -> Option<(f64, f64)> {
    let edges = &eval.histogram.edges;
    let (&lo, &hi) = (edges.first()?, edges.last()?);
    (lo.is_finite() && hi.is_finite() && hi > lo).then_some((lo, hi))
}

fn draw_bars(grid: &mut [Vec<char>], eval: &EvaluationResult, x_min: f64, x_max: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();
    let heights = &eval.histogram.heights;
    if heights.is_empty() {
        return;
    }
    let bin_width = (x_max - x_min) / heights.len() as f64;

    for col in 0..width {
        // Column centre in data space.
        let x = x_min + (col as f64 + 0.5) / width as f64 * (x_max - x_min);
        let bin = (((x - x_min) / bin_width).floor() as usize).min(heights.len() - 1);
        let h = heights[bin];
        if h <= 0.0 {
            continue;
        }
        let top = map_y(h, y_max, height);
        for row in grid.iter_mut().take(height).skip(top) {
            row[col] = '#';
        }
    }
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). The curve overwrites whatever is underneath.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
