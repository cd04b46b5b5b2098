//! Plotters rendering of the fit chart.
//!
//! One drawing routine, two targets:
//! - the Ratatui TUI (via `plotters-ratatui-backend`, see `tui::plotters_chart`)
//! - `dfit fit --svg PATH` (Plotters' SVG backend)
//!
//! Bars are drawn as plain `Rectangle` elements so only the `line_series` feature is
//! needed for the density curve.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::{EvaluationResult, Family, Histogram};
use crate::error::PipelineError;
use crate::report::fmt_num;

/// Render-only description of the chart, computed outside the draw call.
#[derive(Debug, Clone)]
pub struct ChartView<'a> {
    pub family: Family,
    pub histogram: &'a Histogram,
    pub curve: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> ChartView<'a> {
    pub fn new(eval: &'a EvaluationResult, family: Family) -> Self {
        let edges = &eval.histogram.edges;
        let x0 = edges.first().copied().unwrap_or(0.0);
        let x1 = edges.last().copied().unwrap_or(1.0);

        let y_max = eval
            .histogram
            .heights
            .iter()
            .chain(&eval.density)
            .copied()
            .fold(0.0, f64::max);
        let y_top = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

        Self {
            family,
            histogram: &eval.histogram,
            curve: eval.curve(),
            x_bounds: [x0, x1],
            y_bounds: [0.0, y_top],
        }
    }

    pub fn title(&self) -> String {
        format!("Distribution Fit: {}", self.family.display_name())
    }

    fn is_drawable(&self) -> bool {
        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite() && x1 > x0 && y1 > y0
    }
}

/// Colors for one rendering target.
#[derive(Debug, Clone, Copy)]
pub struct ChartTheme {
    /// `None` leaves the target's background alone (terminal).
    pub background: Option<RGBColor>,
    pub text: RGBColor,
    pub grid: RGBColor,
    pub bar: RGBColor,
    pub bar_border: RGBColor,
    pub curve: RGBColor,
    /// The TUI shows the title in its block border instead.
    pub show_caption: bool,
    pub caption_size: u32,
    pub label_size: u32,
    /// Left and bottom label areas, in backend units.
    pub label_area: (u32, u32),
}

impl ChartTheme {
    /// High-contrast palette for dark terminals.
    pub const TERMINAL: ChartTheme = ChartTheme {
        background: None,
        text: WHITE,
        grid: RGBColor(128, 128, 128),
        bar: RGBColor(70, 130, 180),
        bar_border: WHITE,
        curve: RGBColor(255, 64, 64),
        show_caption: false,
        caption_size: 12,
        label_size: 10,
        label_area: (6, 3),
    };

    /// Light palette for SVG output.
    pub const DOCUMENT: ChartTheme = ChartTheme {
        background: Some(WHITE),
        text: BLACK,
        grid: RGBColor(200, 200, 200),
        bar: RGBColor(70, 130, 180),
        bar_border: BLACK,
        curve: RGBColor(139, 0, 0),
        show_caption: true,
        caption_size: 24,
        label_size: 14,
        label_area: (84, 42),
    };
}

/// Draw the histogram, the fitted density and a legend onto `root`.
pub fn draw_fit_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    view: &ChartView<'_>,
    theme: &ChartTheme,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if !view.is_drawable() {
        return Ok(());
    }
    if let Some(bg) = theme.background {
        root.fill(&bg)?;
    }

    let [x0, x1] = view.x_bounds;
    let [y0, y1] = view.y_bounds;

    let mut builder = ChartBuilder::on(root);
    if theme.show_caption {
        builder.caption(
            view.title(),
            ("sans-serif", theme.caption_size).into_font().color(&theme.text),
        );
    }
    let mut chart = builder
        .margin(1)
        .set_label_area_size(LabelAreaPosition::Left, theme.label_area.0)
        .set_label_area_size(LabelAreaPosition::Bottom, theme.label_area.1)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Value")
        .y_desc("Density")
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&|v| fmt_num(*v))
        .y_label_formatter(&|v| fmt_num(*v))
        .label_style(("sans-serif", theme.label_size).into_font().color(&theme.text))
        .axis_style(&theme.text)
        .bold_line_style(&theme.grid.mix(0.5))
        .light_line_style(&theme.grid.mix(0.2))
        .draw()?;

    let bars: Vec<[(f64, f64); 2]> = view
        .histogram
        .edges
        .windows(2)
        .zip(&view.histogram.heights)
        .map(|(w, &h)| [(w[0], 0.0), (w[1], h)])
        .collect();

    let bar_fill = theme.bar.mix(0.6).filled();
    chart
        .draw_series(bars.iter().map(|&corners| Rectangle::new(corners, bar_fill)))?
        .label("Data Histogram")
        .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 14, y + 4)], bar_fill));
    chart.draw_series(
        bars.iter()
            .map(|&corners| Rectangle::new(corners, theme.bar_border.stroke_width(1))),
    )?;

    let curve_style = theme.curve.stroke_width(2);
    chart
        .draw_series(LineSeries::new(view.curve.iter().copied(), curve_style))?
        .label(format!("{} Fit", view.family.display_name()))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 14, y)], curve_style));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", theme.label_size).into_font().color(&theme.text))
        .border_style(&theme.text)
        .draw()?;

    Ok(())
}

/// Write the chart as an SVG file.
pub fn write_svg(path: &Path, view: &ChartView<'_>, size: (u32, u32)) -> Result<(), PipelineError> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_fit_chart(&root, view, &ChartTheme::DOCUMENT).map_err(render_error)?;
    root.present().map_err(render_error)?;
    tracing::info!(path = %path.display(), "wrote svg chart");
    Ok(())
}

fn render_error(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Render(e.to_string())
}
