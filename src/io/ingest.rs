//! Sample acquisition from free text or a CSV column.
//!
//! Rules:
//! - text: tokens are separated by commas and/or any whitespace; one bad token rejects
//!   the whole input (no partial samples)
//! - CSV: header row required; only the selected column is parsed, missing cells are
//!   dropped, anything else non-numeric is an error naming the line
//! - both paths end in `Sample::new`, which enforces the size gate

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{DataSource, Sample};
use crate::error::PipelineError;

/// Cell values treated as missing and silently dropped.
const MISSING_TOKENS: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// Resolve a data source into a validated sample.
pub fn acquire(source: &DataSource) -> Result<Sample, PipelineError> {
    let sample = match source {
        DataSource::Text(text) => parse_text_sample(text)?,
        DataSource::Csv { path, column } => Sample::new(read_csv_column(path, column.as_deref())?)?,
    };
    tracing::info!(source = %source.describe(), n = sample.len(), "sample acquired");
    Ok(sample)
}

/// Parse numbers separated by commas and/or whitespace.
pub fn parse_text_sample(text: &str) -> Result<Sample, PipelineError> {
    let mut values = Vec::new();
    for token in text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => values.push(v),
            _ => {
                tracing::debug!(token, "rejecting text input");
                return Err(PipelineError::Parse {
                    token: token.to_string(),
                });
            }
        }
    }

    if values.is_empty() {
        return Err(PipelineError::NoData);
    }
    Sample::new(values)
}

/// Column names of a CSV file, in file order.
pub fn csv_columns(path: &Path) -> Result<Vec<String>, PipelineError> {
    let mut reader = csv_reader(open(path)?);
    headers(&mut reader, path)
}

/// Numeric values of one CSV column (`None` = first column), missing cells dropped.
pub fn read_csv_column(path: &Path, column: Option<&str>) -> Result<Vec<f64>, PipelineError> {
    read_column(open(path)?, path, column)
}

/// Like [`read_csv_column`], over any reader. `path` is only used in error messages.
pub fn read_column<R: Read>(
    input: R,
    path: &Path,
    column: Option<&str>,
) -> Result<Vec<f64>, PipelineError> {
    let mut reader = csv_reader(input);
    let names = headers(&mut reader, path)?;

    let idx = match column {
        Some(name) => names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| PipelineError::UnknownColumn {
                column: name.to_string(),
                available: names.join(", "),
            })?,
        None if names.is_empty() => {
            return Err(csv_error(path, "file has no columns"));
        }
        None => 0,
    };
    tracing::debug!(column = %names[idx], "reading csv column");

    let mut values = Vec::new();
    let mut dropped = 0usize;
    for (i, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based
        let line = i + 2;
        let record = result.map_err(|e| csv_error(path, format!("line {line}: {e}")))?;
        match parse_cell(&record, idx) {
            Cell::Value(v) => values.push(v),
            Cell::Missing => dropped += 1,
            Cell::Invalid(raw) => {
                return Err(csv_error(
                    path,
                    format!("line {line}: non-numeric value '{raw}' in column '{}'", names[idx]),
                ));
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "dropped missing cells");
    }
    Ok(values)
}

enum Cell<'a> {
    Value(f64),
    Missing,
    Invalid(&'a str),
}

fn parse_cell(record: &StringRecord, idx: usize) -> Cell<'_> {
    // Flexible records may be short; a missing trailing cell is just missing.
    let Some(raw) = record.get(idx).map(str::trim) else {
        return Cell::Missing;
    };
    if MISSING_TOKENS.contains(&raw) {
        return Cell::Missing;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Value(v),
        _ => Cell::Invalid(raw),
    }
}

fn open(path: &Path) -> Result<File, PipelineError> {
    File::open(path).map_err(|e| csv_error(path, e))
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn headers<R: Read>(reader: &mut csv::Reader<R>, path: &Path) -> Result<Vec<String>, PipelineError> {
    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, format!("failed to read headers: {e}")))?;
    Ok(headers.iter().map(normalize_header_name).collect())
}

fn normalize_header_name(name: &str) -> String {
    // Excel likes to prefix UTF-8 exports with a BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn csv_error(path: &Path, reason: impl ToString) -> PipelineError {
    PipelineError::Csv {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(text: &str) -> Vec<f64> {
        parse_text_sample(text).unwrap().values().to_vec()
    }

    fn column(csv: &str, name: Option<&str>) -> Result<Vec<f64>, PipelineError> {
        read_column(csv.as_bytes(), Path::new("test.csv"), name)
    }

    #[test]
    fn separators_are_interchangeable() {
        assert_eq!(values("1,2,3"), vec![1.0, 2.0, 3.0]);
        assert_eq!(values("1 2 3"), vec![1.0, 2.0, 3.0]);
        assert_eq!(values("1,\n2 3"), vec![1.0, 2.0, 3.0]);
        assert_eq!(values(" 1 ,, 2\t3 \n"), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn bad_token_rejects_everything() {
        assert_eq!(
            parse_text_sample("1, a, 3"),
            Err(PipelineError::Parse { token: "a".to_string() })
        );
        assert!(matches!(parse_text_sample("1 inf 2"), Err(PipelineError::Parse { .. })));
    }

    #[test]
    fn empty_and_short_text() {
        assert_eq!(parse_text_sample(" , \n"), Err(PipelineError::NoData));
        assert_eq!(
            parse_text_sample("42"),
            Err(PipelineError::InsufficientData { found: 1 })
        );
    }

    #[test]
    fn named_column_ignores_other_columns() {
        let csv = "id,value\nA1,1.5\nB-2,2.5\nzz,3.5\n";
        assert_eq!(column(csv, Some("value")).unwrap(), vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn first_column_is_default() {
        let csv = "x,y\n1,10\n2,20\n";
        assert_eq!(column(csv, None).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn missing_cells_are_dropped() {
        let csv = "value,other\n1\n,x\nNA,x\n2,x\nnan,x\n3,x\n";
        assert_eq!(column(csv, Some("value")).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn non_numeric_cell_names_the_line() {
        let err = column("value\n1\noops\n", Some("value")).unwrap_err();
        match err {
            PipelineError::Csv { reason, .. } => assert!(reason.contains("line 3"), "{reason}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_column_lists_available() {
        let err = column("a,b\n1,2\n", Some("c")).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownColumn {
                column: "c".to_string(),
                available: "a, b".to_string()
            }
        );
    }

    #[test]
    fn bom_and_padding_are_stripped_from_headers() {
        let csv = "\u{feff} value , id\n1,a\n2,b\n";
        assert_eq!(column(csv, Some("value")).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn missing_file_is_a_csv_error() {
        let err = csv_columns(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Csv { .. }));
    }
}
