//! Dense real matrix engine.
//!
//! Storage is a `nalgebra::DMatrix<f64>`; this wrapper adds the checked
//! operations the fitters rely on:
//!
//! - `multiply` refuses mismatched inner dimensions instead of panicking
//! - `invert` uses closed-form cofactor formulas up to 3x3 and Gauss–Jordan
//!   elimination with partial pivoting above that
//! - singularity is an absolute test: `|det| < 1e-30` on the closed-form path,
//!   `|pivot| < 1e-30` on the elimination path

use nalgebra::DMatrix;

use crate::error::FitError;

/// Determinants / pivots smaller than this make a matrix singular.
pub const SINGULAR_THRESHOLD: f64 = 1e-30;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: DMatrix<f64>,
}

impl Matrix {
    /// Zero-filled `nr x nc` matrix.
    pub fn new(nr: usize, nc: usize) -> Self {
        Self {
            data: DMatrix::zeros(nr, nc),
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            data: DMatrix::identity(n, n),
        }
    }

    /// Build from row-major values.
    ///
    /// # Panics
    /// Panics if `values.len() != nr * nc`.
    pub fn from_row_slice(nr: usize, nc: usize, values: &[f64]) -> Self {
        Self {
            data: DMatrix::from_row_slice(nr, nc, values),
        }
    }

    pub fn from_fn(nr: usize, nc: usize, f: impl FnMut(usize, usize) -> f64) -> Self {
        Self {
            data: DMatrix::from_fn(nr, nc, f),
        }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[(r, c)]
    }

    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        self.data[(r, c)] = value;
    }

    /// Copy of row `r`.
    pub fn row(&self, r: usize) -> Vec<f64> {
        self.data.row(r).iter().copied().collect()
    }

    pub fn transpose(&self) -> Matrix {
        Self {
            data: self.data.transpose(),
        }
    }

    /// `self · rhs`; requires `self.cols() == rhs.rows()`.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix, FitError> {
        if self.cols() != rhs.rows() {
            return Err(FitError::DimensionMismatch {
                op: "multiply",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        Ok(Matrix {
            data: &self.data * &rhs.data,
        })
    }

    /// Inverse of a square matrix.
    pub fn invert(&self) -> Result<Matrix, FitError> {
        if self.rows() != self.cols() {
            return Err(FitError::DimensionMismatch {
                op: "invert",
                left: self.shape(),
                right: self.shape(),
            });
        }
        match self.rows() {
            0 => Err(FitError::SingularMatrix),
            1 => self.invert_1x1(),
            2 => self.invert_2x2(),
            3 => self.invert_3x3(),
            _ => self.invert_gauss_jordan(),
        }
    }

    /// Largest absolute element-wise difference; `None` if shapes differ.
    pub fn max_abs_diff(&self, other: &Matrix) -> Option<f64> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max),
        )
    }

    fn invert_1x1(&self) -> Result<Matrix, FitError> {
        let det = self.data[(0, 0)];
        if det.abs() < SINGULAR_THRESHOLD {
            return Err(FitError::SingularMatrix);
        }
        Ok(Matrix::from_row_slice(1, 1, &[1.0 / det]))
    }

    fn invert_2x2(&self) -> Result<Matrix, FitError> {
        let m = &self.data;
        let det = m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)];
        if det.abs() < SINGULAR_THRESHOLD {
            return Err(FitError::SingularMatrix);
        }
        let inv = 1.0 / det;
        Ok(Matrix::from_row_slice(
            2,
            2,
            &[
                m[(1, 1)] * inv,
                -m[(0, 1)] * inv,
                -m[(1, 0)] * inv,
                m[(0, 0)] * inv,
            ],
        ))
    }

    fn invert_3x3(&self) -> Result<Matrix, FitError> {
        let m = &self.data;
        // Cofactors of the first row.
        let c00 = m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)];
        let c01 = m[(1, 2)] * m[(2, 0)] - m[(1, 0)] * m[(2, 2)];
        let c02 = m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)];

        let det = m[(0, 0)] * c00 + m[(0, 1)] * c01 + m[(0, 2)] * c02;
        if det.abs() < SINGULAR_THRESHOLD {
            return Err(FitError::SingularMatrix);
        }
        let inv = 1.0 / det;

        // Adjugate (transposed cofactor matrix) scaled by 1/det.
        let values = [
            c00 * inv,
            (m[(0, 2)] * m[(2, 1)] - m[(0, 1)] * m[(2, 2)]) * inv,
            (m[(0, 1)] * m[(1, 2)] - m[(0, 2)] * m[(1, 1)]) * inv,
            c01 * inv,
            (m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)]) * inv,
            (m[(0, 2)] * m[(1, 0)] - m[(0, 0)] * m[(1, 2)]) * inv,
            c02 * inv,
            (m[(0, 1)] * m[(2, 0)] - m[(0, 0)] * m[(2, 1)]) * inv,
            (m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)]) * inv,
        ];
        Ok(Matrix::from_row_slice(3, 3, &values))
    }

    fn invert_gauss_jordan(&self) -> Result<Matrix, FitError> {
        let n = self.rows();
        let mut a = self.data.clone();
        let mut inv = DMatrix::<f64>::identity(n, n);

        for col in 0..n {
            // Partial pivoting: bring the largest candidate onto the diagonal.
            let mut pivot_row = col;
            let mut pivot_abs = a[(col, col)].abs();
            for r in (col + 1)..n {
                let v = a[(r, col)].abs();
                if v > pivot_abs {
                    pivot_abs = v;
                    pivot_row = r;
                }
            }
            if pivot_row != col {
                a.swap_rows(col, pivot_row);
                inv.swap_rows(col, pivot_row);
            }

            let pivot = a[(col, col)];
            if pivot.abs() < SINGULAR_THRESHOLD {
                return Err(FitError::SingularMatrix);
            }

            let scale = 1.0 / pivot;
            for c in 0..n {
                a[(col, c)] *= scale;
                inv[(col, c)] *= scale;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a[(r, col)];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    a[(r, c)] -= factor * a[(col, c)];
                    inv[(r, c)] -= factor * inv[(col, c)];
                }
            }
        }

        Ok(Matrix { data: inv })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_conditioned(n: usize) -> Matrix {
        // Diagonally dominant, non-symmetric.
        Matrix::from_fn(n, n, |r, c| {
            if r == c {
                10.0 + r as f64
            } else {
                1.0 / (1.0 + r as f64 + 2.0 * c as f64)
            }
        })
    }

    #[test]
    fn new_matrix_is_zero_filled() {
        let m = Matrix::new(2, 3);
        assert_eq!(m.shape(), (2, 3));
        for r in 0..2 {
            assert!(m.row(r).iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn multiply_rejects_mismatched_dimensions() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(2, 3);
        let err = a.multiply(&b).unwrap_err();
        assert_eq!(
            err,
            FitError::DimensionMismatch {
                op: "multiply",
                left: (2, 3),
                right: (2, 3),
            }
        );
    }

    #[test]
    fn multiply_small_product() {
        let a = Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = Matrix::from_row_slice(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = a.multiply(&b).unwrap();
        assert_eq!(c, Matrix::from_row_slice(2, 2, &[58.0, 64.0, 139.0, 154.0]));
    }

    #[test]
    fn transpose_twice_is_identity() {
        let a = Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a.transpose().shape(), (3, 2));
        assert_eq!(a.transpose().get(2, 1), 6.0);
        assert_eq!(a.transpose().transpose(), a);
    }

    #[test]
    fn invert_twice_recovers_matrix_for_all_paths() {
        for n in 1..=6 {
            let m = well_conditioned(n);
            let back = m.invert().unwrap().invert().unwrap();
            let diff = m.max_abs_diff(&back).unwrap();
            assert!(diff < 1e-10, "n={n}: diff {diff}");
        }
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        for n in 1..=5 {
            let m = well_conditioned(n);
            let prod = m.multiply(&m.invert().unwrap()).unwrap();
            assert!(prod.max_abs_diff(&Matrix::identity(n)).unwrap() < 1e-12);
        }
    }

    #[test]
    fn closed_form_agrees_with_elimination() {
        let m = well_conditioned(3);
        let closed = m.invert().unwrap();
        let general = m.invert_gauss_jordan().unwrap();
        assert!(closed.max_abs_diff(&general).unwrap() < 1e-12);
    }

    #[test]
    fn invert_detects_singular_matrices() {
        let s2 = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_eq!(s2.invert().unwrap_err(), FitError::SingularMatrix);

        let s3 = Matrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0]);
        assert_eq!(s3.invert().unwrap_err(), FitError::SingularMatrix);

        // Last two rows identical; power-of-two entries keep the elimination exact.
        let s4 = Matrix::from_row_slice(
            4,
            4,
            &[
                2.0, 0.0, 0.0, 0.0, //
                0.0, 4.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 1.0, //
                0.0, 0.0, 1.0, 1.0,
            ],
        );
        assert_eq!(s4.invert().unwrap_err(), FitError::SingularMatrix);
    }

    #[test]
    fn gauss_jordan_needs_pivoting() {
        // Zero on the leading diagonal; only solvable with a row swap.
        let m = Matrix::from_row_slice(
            4,
            4,
            &[
                0.0, 1.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 2.0, //
                0.0, 0.0, 4.0, 0.0,
            ],
        );
        let inv = m.invert().unwrap();
        let prod = m.multiply(&inv).unwrap();
        assert!(prod.max_abs_diff(&Matrix::identity(4)).unwrap() < 1e-15);
    }

    #[test]
    fn invert_rejects_non_square() {
        let err = Matrix::new(2, 3).invert().unwrap_err();
        assert!(matches!(err, FitError::DimensionMismatch { op: "invert", .. }));
    }
}
