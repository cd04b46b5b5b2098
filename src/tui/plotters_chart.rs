//! Plotters-powered fit chart widget for Ratatui.
//!
//! The drawing itself lives in `plot::chart` and is shared with the SVG export;
//! this widget only adapts it to the Ratatui buffer via `plotters-ratatui-backend`.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::{ChartTheme, ChartView, draw_fit_chart};

/// Histogram plus fitted density, drawn with the terminal palette.
pub struct FitChart<'a> {
    pub view: &'a ChartView<'a>,
}

impl Widget for FitChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            if !area.is_empty() {
                buf.set_stringn(
                    area.x,
                    area.y,
                    "Chart area too small (resize terminal).",
                    area.width as usize,
                    Style::default().fg(Color::Yellow),
                );
            }
            return;
        }

        let view = self.view;
        let widget = widget_fn(move |root| {
            draw_fit_chart(&root, view, &ChartTheme::TERMINAL)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
