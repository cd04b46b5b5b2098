//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for the data text, CSV file and column,
//! distribution family and one slider per parameter, then renders the histogram
//! with the fitted density next to the parameter table and error metrics.
//!
//! Every handled key press re-runs the whole pipeline. The only state carried
//! between runs is the `ManualControls` handed back by the previous run.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::RunConfig;
use crate::app::pipeline::{self, RunOutput};
use crate::cli::InputArgs;
use crate::cli::picker::{discover_csv_files, pretty_path};
use crate::domain::{DataSource, EvalConfig, Family};
use crate::error::{AppError, PipelineError};
use crate::fit::ManualControls;
use crate::plot::ChartView;
use crate::report::{LOCKED_MARKER, fmt_num, format_metrics};

mod plotters_chart;

use plotters_chart::FitChart;

/// Slider steps moved by `[` and `]`.
const COARSE_STEPS: i32 = 100;

/// Start the TUI.
pub fn run(args: InputArgs) -> Result<(), AppError> {
    // Resolve inputs (and drain stdin for `--data -`) before raw mode.
    let config = crate::app::run_config_from_args(&args)?;
    let files = discover_csv_files();

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, files);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Rows of the settings list before the per-parameter sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Data,
    File,
    Column,
    Distribution,
    Slider(usize),
}

const FIXED_FIELDS: usize = 4;

struct App {
    text: String,
    editing_text: bool,
    files: Vec<PathBuf>,
    /// `None` selects text input.
    file_idx: Option<usize>,
    columns: Vec<String>,
    column_idx: usize,
    family: Family,
    eval: EvalConfig,
    controls: Option<ManualControls>,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
    error: Option<PipelineError>,
}

impl App {
    fn new(config: RunConfig, mut files: Vec<PathBuf>) -> Self {
        let mut text = String::new();
        let mut file_idx = None;
        let mut wanted_column = None;

        match config.source {
            Some(DataSource::Text(t)) => text = t,
            Some(DataSource::Csv { path, column }) => {
                let idx = match files.iter().position(|f| same_file(f, &path)) {
                    Some(idx) => idx,
                    None => {
                        files.push(path);
                        files.len() - 1
                    }
                };
                file_idx = Some(idx);
                wanted_column = column;
            }
            None => {}
        }

        let mut app = Self {
            text,
            editing_text: false,
            files,
            file_idx,
            columns: Vec::new(),
            column_idx: 0,
            family: config.family,
            eval: config.eval,
            controls: None,
            selected_field: 0,
            status: String::new(),
            run: None,
            error: None,
        };
        app.load_columns();
        if let Some(wanted) = wanted_column {
            match app.columns.iter().position(|c| *c == wanted) {
                Some(idx) => app.column_idx = idx,
                None => app.status = format!("Column '{wanted}' not found; using the first column."),
            }
        }
        app.rerun();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_text {
            self.handle_text_edit(code);
            self.rerun();
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < self.field_count() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('[') => self.adjust_field(-COARSE_STEPS),
            KeyCode::Char(']') => self.adjust_field(COARSE_STEPS),
            KeyCode::Char('0') => {
                if let Field::Slider(i) = self.field() {
                    if let Some(slider) = self.controls.as_mut().and_then(|c| c.slider_mut(i)) {
                        slider.reset();
                        self.status = format!("Parameter {} reset.", i + 1);
                    }
                }
            }
            KeyCode::Enter => {
                if self.field() == Field::Data {
                    self.editing_text = true;
                    self.status = "Editing data. Enter or Esc to finish.".to_string();
                }
            }
            KeyCode::Char('r') => {
                self.files = discover_csv_files();
                self.file_idx = None;
                self.load_columns();
                self.status = format!("Found {} CSV file(s).", self.files.len());
            }
            _ => {}
        }

        self.rerun();
        false
    }

    fn handle_text_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing_text = false;
                self.status = "Data updated.".to_string();
            }
            KeyCode::Backspace => {
                self.text.pop();
            }
            KeyCode::Char(c) => self.text.push(c),
            KeyCode::Tab => self.text.push(' '),
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.field() {
            Field::Data => {}
            Field::File => {
                // Cycle through "none" followed by every discovered file.
                let slots = self.files.len() + 1;
                let cur = self.file_idx.map_or(0, |i| i + 1);
                let next = (cur as i64 + i64::from(delta.signum())).rem_euclid(slots as i64) as usize;
                self.file_idx = next.checked_sub(1);
                self.load_columns();
                self.status = format!("file: {}", self.file_label());
            }
            Field::Column => {
                if !self.columns.is_empty() {
                    let n = self.columns.len() as i64;
                    self.column_idx =
                        (self.column_idx as i64 + i64::from(delta.signum())).rem_euclid(n) as usize;
                    self.status = format!("column: {}", self.columns[self.column_idx]);
                }
            }
            Field::Distribution => {
                self.family = if delta >= 0 {
                    self.family.next()
                } else {
                    self.family.prev()
                };
                // Sliders belong to the previous family's fit.
                self.controls = None;
                self.status = format!("distribution: {}", self.family.display_name());
            }
            Field::Slider(i) => {
                if let Some(slider) = self.controls.as_mut().and_then(|c| c.slider_mut(i)) {
                    if slider.is_inverted() {
                        self.status = format!("Parameter {} is locked (inverted bounds).", i + 1);
                    } else {
                        slider.nudge(delta);
                    }
                }
            }
        }
    }

    fn load_columns(&mut self) {
        self.column_idx = 0;
        self.columns.clear();
        let Some(path) = self.selected_file() else {
            return;
        };
        match crate::io::csv_columns(path) {
            Ok(columns) => self.columns = columns,
            Err(err) => self.status = err.to_string(),
        }
    }

    fn source(&self) -> Option<DataSource> {
        if let Some(path) = self.selected_file() {
            return Some(DataSource::Csv {
                path: path.clone(),
                column: self.columns.get(self.column_idx).cloned(),
            });
        }
        if self.text.trim().is_empty() {
            None
        } else {
            Some(DataSource::Text(self.text.clone()))
        }
    }

    fn rerun(&mut self) {
        let result = match self.source() {
            Some(source) => pipeline::run(&source, self.family, self.controls.as_ref(), &[], &self.eval),
            None => Err(PipelineError::NoData),
        };

        match result {
            Ok(out) => {
                self.controls = Some(out.controls.clone());
                self.run = Some(out);
                self.error = None;
            }
            Err(err) => {
                // Sliders only survive when the fit itself succeeded, so an invalid
                // manual value can be moved back.
                if !matches!(err, PipelineError::Override(_)) {
                    self.controls = None;
                }
                self.run = None;
                self.error = Some(err);
            }
        }

        self.selected_field = self.selected_field.min(self.field_count() - 1);
    }

    fn selected_file(&self) -> Option<&PathBuf> {
        self.file_idx.and_then(|i| self.files.get(i))
    }

    fn file_label(&self) -> String {
        self.selected_file()
            .map(|p| pretty_path(p))
            .unwrap_or_else(|| "none (use data text)".to_string())
    }

    fn slider_count(&self) -> usize {
        self.controls.as_ref().map_or(0, |c| c.sliders().len())
    }

    fn field_count(&self) -> usize {
        FIXED_FIELDS + self.slider_count()
    }

    fn field(&self) -> Field {
        match self.selected_field {
            0 => Field::Data,
            1 => Field::File,
            2 => Field::Column,
            3 => Field::Distribution,
            i => Field::Slider(i - FIXED_FIELDS),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("dfit", Style::default().fg(Color::Cyan)),
            Span::raw(" - Statistical Distribution Fitting Tool"),
        ]));

        let source = self
            .source()
            .map(|s| s.describe())
            .unwrap_or_else(|| "-".to_string());
        let sample = self
            .run
            .as_ref()
            .map(|r| {
                format!(
                    "n={} | range=[{}, {}]",
                    r.sample.len(),
                    fmt_num(r.sample.min()),
                    fmt_num(r.sample.max())
                )
            })
            .unwrap_or_else(|| "n=0".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "source: {source} | distribution: {} | {sample}",
                self.family.display_name()
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(48)])
            .split(area);

        self.draw_chart(frame, columns[0]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.field_count() as u16 + 2),
                Constraint::Min(0),
                Constraint::Length(4),
            ])
            .split(columns[1]);

        self.draw_settings(frame, side[0]);
        self.draw_params(frame, side[1]);
        self.draw_metrics(frame, side[2]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("Distribution Fit: {}", self.family.display_name()))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = match &self.error {
                Some(err) => Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red)),
                None => Paragraph::new("Waiting for data...").style(Style::default().fg(Color::Yellow)),
            };
            frame.render_widget(msg.wrap(Wrap { trim: true }), inner);
            return;
        };

        let view = ChartView::new(&run.eval, self.family);
        let (chart_rect, insets) = chart_layout(inner);
        frame.render_widget(FitChart { view: &view }, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, view.x_bounds, view.y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let data_label = if self.editing_text {
            format!("{}_", self.text)
        } else if self.text.trim().is_empty() {
            "(empty)".to_string()
        } else {
            self.text.clone()
        };
        let column_label = self
            .columns
            .get(self.column_idx)
            .cloned()
            .unwrap_or_else(|| "-".to_string());

        let mut items = Vec::new();
        items.push(ListItem::new(format!("Data: {data_label}")));
        items.push(ListItem::new(format!("File: {}", self.file_label())));
        items.push(ListItem::new(format!("Column: {column_label}")));
        items.push(ListItem::new(format!("Distribution: {}", self.family.display_name())));

        if let Some(controls) = &self.controls {
            for s in controls.sliders() {
                let mut text = format!(
                    "{}: {:.2} [{:.2}, {:.2}]",
                    s.label(),
                    s.value(),
                    s.lower(),
                    s.upper()
                );
                let mut style = Style::default();
                if s.is_inverted() {
                    text.push(' ');
                    text.push_str(LOCKED_MARKER);
                    style = style.fg(Color::DarkGray);
                }
                items.push(ListItem::new(text).style(style));
            }
        }

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_text {
            let hint = Paragraph::new("Editing data…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(1),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_params(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Parameters").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(Paragraph::new("-").block(block), area);
            return;
        };

        let mut lines = vec![Line::from(Span::styled(
            format!("{:<9} {:<10} {:>12} {:>12}", "param", "role", "value", "fitted"),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for ((name, role, value), fitted) in run.params.rows().into_iter().zip(run.fitted.values()) {
            lines.push(Line::from(format!(
                "{name:<9} {role:<10} {value:>12.4} {fitted:>12.4}"
            )));
        }
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_metrics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Fit Quality").borders(Borders::ALL);
        let p = match (&self.run, &self.error) {
            (Some(run), _) => Paragraph::new(format_metrics(&run.eval)),
            (None, Some(err)) => Paragraph::new(err.to_string())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true }),
            (None, None) => Paragraph::new("-"),
        };
        frame.render_widget(p.block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  [/] coarse  0 reset  Enter edit data  r rescan  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 10,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_num(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_num(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("Value")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("Density")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
