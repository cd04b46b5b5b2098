//! CSV file discovery and validation.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker feeds the TUI's file selector and validates `--file` up front
//!
//! Discovery searches for `*.csv` files under the current working directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Check that `path` names an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, PipelineError> {
    let reject = |reason: &str| {
        Err(PipelineError::Csv {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        })
    };

    if !path.exists() {
        return reject("file not found");
    }
    if path.is_dir() {
        return reject("expected a file, got a directory");
    }
    if !has_csv_extension(path) {
        return reject("expected a .csv file (use --data for pasted numbers)");
    }
    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
///
/// Used by the Ratatui TUI's file selector.
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by(|a, b| pretty_path(a).cmp(&pretty_path(b)));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_csv_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

pub fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_and_non_csv_paths() {
        assert!(validate_csv_path(Path::new("no/such/file.csv")).is_err());
        assert!(validate_csv_path(Path::new("Cargo.toml")).is_err());
        assert!(validate_csv_path(Path::new("src")).is_err());
    }

    #[test]
    fn skips_build_and_vcs_dirs() {
        assert!(should_skip_dir(Path::new("./target")));
        assert!(should_skip_dir(Path::new("a/.git")));
        assert!(!should_skip_dir(Path::new("data")));
    }

    #[test]
    fn pretty_path_strips_dot_prefix() {
        assert_eq!(pretty_path(Path::new("./data/x.csv")), "data/x.csv");
    }

    #[test]
    fn finds_csv_files_in_sorted_order() {
        let root = std::env::temp_dir().join(format!("dfit-picker-{}", std::process::id()));
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::write(root.join("b.csv"), "x\n1\n").unwrap();
        fs::write(root.join("nested").join("a.CSV"), "x\n1\n").unwrap();
        fs::write(root.join("target").join("skip.csv"), "x\n1\n").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let found = find_csv_files(&root, DEFAULT_SEARCH_DEPTH);
        fs::remove_dir_all(&root).ok();

        let names: Vec<String> = found
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.csv", "a.CSV"]);
    }
}
