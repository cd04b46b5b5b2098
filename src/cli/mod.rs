//! Command-line parsing for the distribution fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{EvalConfig, Family};
use crate::fit::ParamOverride;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dfit", version, about = "Statistical distribution fitting tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a distribution to a sample and print parameters, chart and error metrics.
    Fit(FitArgs),
    /// List the columns of a CSV file.
    Columns(ColumnsArgs),
    /// List the available distributions.
    Dists,
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `dfit fit`, re-running it on every
    /// key press and rendering results with Ratatui.
    Tui(InputArgs),
}

/// Where the sample comes from, plus evaluation settings. Shared by `fit` and `tui`.
#[derive(Debug, Parser, Clone)]
pub struct InputArgs {
    /// Numbers separated by commas and/or whitespace (`-` reads stdin).
    #[arg(short = 'd', long, value_name = "TEXT")]
    pub data: Option<String>,

    /// CSV file with a header row (takes precedence over --data).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// CSV column to fit (defaults to the first column).
    #[arg(short = 'c', long)]
    pub column: Option<String>,

    /// Distribution family.
    #[arg(long = "dist", value_enum, default_value_t = Family::Normal)]
    pub family: Family,

    /// Number of histogram bins.
    #[arg(long, env = "DFIT_BINS", default_value_t = EvalConfig::DEFAULT_BINS)]
    pub bins: usize,

    /// Number of density evaluation points.
    #[arg(long, env = "DFIT_GRID_POINTS", default_value_t = EvalConfig::DEFAULT_GRID_POINTS)]
    pub grid_points: usize,
}

/// Options for `dfit fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Manually set parameter INDEX (1-based) to VALUE; repeatable.
    #[arg(long = "set", value_name = "INDEX=VALUE")]
    pub overrides: Vec<ParamOverride>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the chart as an SVG file.
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Options for `dfit columns`.
#[derive(Debug, Parser)]
pub struct ColumnsArgs {
    /// CSV file with a header row.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_args_parse() {
        let cli = Cli::parse_from([
            "dfit", "fit", "--data", "1 2 3", "--dist", "chi-square", "--set", "1=2.5", "--set",
            "1=3", "--bins", "7",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.input.family, Family::ChiSquare);
        assert_eq!(args.input.bins, 7);
        assert_eq!(args.overrides.len(), 2);
        assert_eq!(args.overrides[1], ParamOverride { index: 1, value: 3.0 });
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn bad_override_is_rejected() {
        assert!(Cli::try_parse_from(["dfit", "fit", "--data", "1 2", "--set", "oops"]).is_err());
    }

    #[test]
    fn unknown_family_is_rejected() {
        assert!(Cli::try_parse_from(["dfit", "fit", "--dist", "poisson"]).is_err());
    }
}
