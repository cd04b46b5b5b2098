//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging for the one-shot commands
//! - runs the fit pipeline
//! - prints reports/plots and writes the optional SVG

use std::io::Read;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{ColumnsArgs, Command, FitArgs, InputArgs, OutputFormat};
use crate::domain::{DataSource, EvalConfig, Family};
use crate::error::{AppError, PipelineError};

pub mod pipeline;

/// Environment variable holding the `tracing` filter (e.g. `DFIT_LOG=debug`).
pub const LOG_ENV: &str = "DFIT_LOG";

/// Entry point for the `dfit` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `dfit` and `dfit --dist gamma` to behave like `dfit tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => {
            init_logging();
            handle_fit(args)
        }
        Command::Columns(args) => {
            init_logging();
            handle_columns(args)
        }
        Command::Dists => {
            init_logging();
            handle_dists()
        }
        // No subscriber here: log lines would corrupt the alternate screen.
        Command::Tui(args) => handle_tui(args),
    }
}

/// Resolved inputs for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub source: Option<DataSource>,
    pub family: Family,
    pub eval: EvalConfig,
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.input)?;
    let source = config.source.ok_or(PipelineError::NoData)?;
    let family = config.family;

    let out = pipeline::run(&source, family, None, &args.overrides, &config.eval)?;

    match args.format {
        OutputFormat::Json => {
            let report = crate::report::FitReport::new(
                source.describe(),
                &out.sample,
                &out.fitted,
                &out.params,
                &out.eval,
            );
            let json = report
                .to_json()
                .map_err(|e| AppError::new(4, format!("Failed to serialize report: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", text_report(&args, &source, &out)),
    }

    if let Some(path) = &args.svg {
        let view = crate::plot::ChartView::new(&out.eval, family);
        crate::plot::write_svg(path, &view, (1000, 600))?;
    }

    Ok(())
}

/// Everything `dfit fit` prints in text mode.
fn text_report(args: &FitArgs, source: &DataSource, out: &pipeline::RunOutput) -> String {
    let family = out.params.family();
    let mut text = String::new();
    text.push_str(&crate::report::format_run_summary(&source.describe(), &out.sample, family));
    text.push('\n');
    text.push_str(&crate::report::format_param_table(&out.params));
    text.push('\n');
    if !args.overrides.is_empty() {
        text.push_str(&crate::report::format_controls(&out.controls));
        text.push('\n');
    }
    if !args.no_plot {
        text.push_str(&crate::plot::render_ascii_plot(&out.eval, family, args.width, args.height));
        text.push('\n');
    }
    text.push_str(&crate::report::format_metrics(&out.eval));
    text
}

fn handle_columns(args: ColumnsArgs) -> Result<(), AppError> {
    let path = crate::cli::picker::validate_csv_path(&args.file)?;
    for name in crate::io::csv_columns(&path)? {
        println!("{name}");
    }
    Ok(())
}

fn handle_dists() -> Result<(), AppError> {
    print!("{}", crate::report::format_catalog());
    Ok(())
}

fn handle_tui(args: InputArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

/// Convert CLI input flags into a validated [`RunConfig`].
///
/// `--data -` reads the text from stdin; `--file` must be an existing `.csv`.
pub fn run_config_from_args(args: &InputArgs) -> Result<RunConfig, AppError> {
    let eval = EvalConfig {
        bins: args.bins,
        grid_points: args.grid_points,
    };
    validate_eval_config(&eval)?;

    let file = args
        .file
        .as_deref()
        .map(crate::cli::picker::validate_csv_path)
        .transpose()?;

    let text = match args.data.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| AppError::new(2, format!("Failed to read stdin: {e}")))?;
            Some(buf)
        }
        other => other.map(str::to_string),
    };

    Ok(RunConfig {
        source: DataSource::resolve(text, file, args.column.clone()),
        family: args.family,
        eval,
    })
}

fn validate_eval_config(eval: &EvalConfig) -> Result<(), AppError> {
    if eval.bins < 1 {
        return Err(AppError::new(2, "`--bins` must be at least 1."));
    }
    if eval.grid_points < 2 {
        return Err(AppError::new(2, "`--grid-points` must be at least 2."));
    }
    Ok(())
}

/// Install a stderr `tracing` subscriber filtered by `DFIT_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second install (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Rewrite argv so `dfit` defaults to `dfit tui`.
///
/// Rules:
/// - `dfit`                      -> `dfit tui`
/// - `dfit --dist gamma ...`     -> `dfit tui --dist gamma ...`
/// - `dfit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "columns" | "dists" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
