//! Load sample points from CSV.
//!
//! Expected schema: a header row naming `x`, `y` and optionally `z` columns
//! (case-insensitive, any order, extra columns ignored). Lines starting with
//! `#` are comments. Rows that fail to parse are collected as `RowError`s
//! rather than aborting the load, so one bad line does not hide the rest.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::PointSet3;
use crate::error::AppError;

/// A CSV row that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LoadedPoints {
    pub points: PointSet3,
    pub has_z: bool,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub fn read_points_csv(path: &Path) -> Result<LoadedPoints, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_points(file)
}

/// Parse points from any CSV source.
pub fn read_points<R: Read>(source: R) -> Result<LoadedPoints, AppError> {
    let mut reader = csv_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let col_x = require_column(&header_map, "x")?;
    let col_y = require_column(&header_map, "y")?;
    let col_z = header_map.get("z").copied();

    let mut points = PointSet3::new(0);
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Fallback when the reader has no position: header is line 1.
        let fallback_line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line: e.position().map_or(fallback_line, |p| p.line() as usize),
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line() as usize);

        match parse_row(&record, col_x, col_y, col_z) {
            Ok((x, y, z)) => points.push(x, y, z),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if points.is_empty() {
        return Err(AppError::new(3, "No valid rows in point file."));
    }

    Ok(LoadedPoints {
        points,
        has_z: col_z.is_some(),
        row_errors,
        rows_read,
    })
}

fn parse_row(
    record: &StringRecord,
    col_x: usize,
    col_y: usize,
    col_z: Option<usize>,
) -> Result<(f64, f64, f64), String> {
    let x = parse_field(record, col_x, "x")?;
    let y = parse_field(record, col_y, "y")?;
    let z = match col_z {
        Some(c) => parse_field(record, c, "z")?,
        None => 0.0,
    };
    Ok((x, y, z))
}

pub(crate) fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(source)
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

pub(crate) fn require_column(map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    map.get(name)
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column '{name}'.")))
}

pub(crate) fn parse_field(record: &StringRecord, col: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(col)
        .ok_or_else(|| format!("missing value for '{name}'"))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("invalid number '{raw}' in column '{name}'"))?;
    if !value.is_finite() {
        return Err(format!("non-finite value in column '{name}'"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_xy_with_comments_and_bad_rows() {
        let csv = "\u{feff}X, Y ,label\n# comment\n1, 2, a\n2, oops, b\n3, 6, c\n";
        let loaded = read_points(csv.as_bytes()).unwrap();
        assert_eq!(loaded.points.x(), &[1.0, 3.0]);
        assert_eq!(loaded.points.y(), &[2.0, 6.0]);
        assert!(!loaded.has_z);
        assert_eq!(loaded.rows_read, 3);
        assert_eq!(loaded.row_errors.len(), 1);
        assert!(loaded.row_errors[0].message.contains("oops"));
    }

    #[test]
    fn reads_optional_z_column() {
        let loaded = read_points("z,x,y\n5,1,2\n".as_bytes()).unwrap();
        assert!(loaded.has_z);
        assert_eq!(loaded.points.iter().next(), Some((1.0, 2.0, 5.0)));
    }

    #[test]
    fn missing_column_is_usage_error() {
        let err = read_points("x,w\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn no_valid_rows_is_data_error() {
        let err = read_points("x,y\nfoo,bar\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
