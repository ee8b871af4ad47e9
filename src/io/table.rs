//! Load a `Poly2d` model from a coefficient table.
//!
//! The table has one row per term with numeric columns `degx`, `degy` and
//! `coeff`. Unlike point files, a bad row fails the whole load: a model with
//! a silently missing term would evaluate to the wrong surface.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::AppError;
use crate::io::points::{build_header_map, csv_reader, parse_field, require_column};
use crate::models::Poly2d;

pub fn read_poly2d_csv(path: &Path) -> Result<Poly2d, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open coefficient table '{}': {e}", path.display()))
    })?;
    read_poly2d(file)
}

pub fn read_poly2d<R: Read>(source: R) -> Result<Poly2d, AppError> {
    let mut reader = csv_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read table headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let col_dx = require_column(&header_map, "degx")?;
    let col_dy = require_column(&header_map, "degy")?;
    let col_coeff = require_column(&header_map, "coeff")?;

    let mut degx = Vec::new();
    let mut degy = Vec::new();
    let mut coeffs = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("Table parse error: {e}")))?;
        let line = record.position().map_or(idx + 2, |p| p.line() as usize);
        let row_err = |message: String| AppError::new(2, format!("Table line {line}: {message}"));

        degx.push(parse_field(&record, col_dx, "degx").map_err(row_err)?);
        degy.push(parse_field(&record, col_dy, "degy").map_err(row_err)?);
        coeffs.push(parse_field(&record, col_coeff, "coeff").map_err(row_err)?);
    }

    if coeffs.is_empty() {
        return Err(AppError::new(3, "Coefficient table has no rows."));
    }

    Poly2d::from_columns(&degx, &degy, &coeffs)
        .map_err(|e| AppError::new(2, format!("Invalid coefficient table: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_table_in_any_column_order() {
        let csv = "coeff,degx,degy\n12.0,0,0\n24.0,1,0\n";
        let poly = read_poly2d(csv.as_bytes()).unwrap();
        assert_eq!(poly.len(), 2);
        assert_eq!(poly.evaluate(2.0, 7.0), 60.0);
    }

    #[test]
    fn loads_table_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "degx,degy,coeff").unwrap();
        writeln!(file, "# constant").unwrap();
        writeln!(file, "0,0,1.5").unwrap();
        writeln!(file, "1,1,2.0").unwrap();
        let poly = read_poly2d_csv(file.path()).unwrap();
        assert_eq!(poly.evaluate(2.0, 3.0), 13.5);
    }

    #[test]
    fn rejects_bad_rows_and_duplicates() {
        let err = read_poly2d("degx,degy,coeff\n0,0,abc\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("coeff"));

        let err = read_poly2d("degx,degy,coeff\n1,0,1\n1,0,2\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        let err = read_poly2d("degx,degy,coeff\n0.5,0,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("non-negative integer"));
    }

    #[test]
    fn empty_table_is_data_error() {
        assert_eq!(read_poly2d("degx,degy,coeff\n".as_bytes()).unwrap_err().exit_code(), 3);
        assert_eq!(read_poly2d("degx,coeff\n0,1\n".as_bytes()).unwrap_err().exit_code(), 2);
    }
}
