//! Error types.
//!
//! - `FitError` is the failure taxonomy of the numerical core. Every fit,
//!   parse, and matrix routine returns it instead of a partially valid result.
//! - `AppError` is what the `nirfit` binary reports: a message plus the process
//!   exit code.

use thiserror::Error;

use crate::domain::LineFit;

/// Failures of the fitting core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("matrix is singular (|determinant| or |pivot| below threshold)")]
    SingularMatrix,

    #[error("dimension mismatch in {op}: {}x{} vs {}x{}", left.0, left.1, right.0, right.1)]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("malformed token '{token}': {reason}")]
    MalformedGrammar { token: String, reason: String },

    #[error("term ({dx},{dy}) exceeds maximum degree {max_degree}")]
    DegreeViolation { dx: u32, dy: u32, max_degree: u32 },

    #[error("duplicate term ({dx},{dy})")]
    DuplicateTerm { dx: u32, dy: u32 },

    #[error("{routine} did not converge after {iterations} iterations")]
    NonConvergence {
        routine: &'static str,
        iterations: usize,
        /// Ordinary least-squares line kept by the robust slope fit when its
        /// bracket search gives up. Its `spread` is the `-1.0` sentinel.
        fallback: Option<LineFit>,
    },
}

impl FitError {
    pub(crate) fn malformed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        FitError::MalformedGrammar {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// The fallback line attached to a robust-fit non-convergence, if any.
    pub fn fallback_line(&self) -> Option<&LineFit> {
        match self {
            FitError::NonConvergence { fallback, .. } => fallback.as_ref(),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(4, format!("Fit failed: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_error_maps_to_fit_exit_code() {
        let err: AppError = FitError::SingularMatrix.into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("singular"));
    }

    #[test]
    fn fallback_line_only_on_non_convergence() {
        let line = LineFit {
            intercept: 1.0,
            slope: 2.0,
            spread: -1.0,
        };
        let err = FitError::NonConvergence {
            routine: "fit_slope_robust",
            iterations: 30,
            fallback: Some(line.clone()),
        };
        assert_eq!(err.fallback_line(), Some(&line));
        assert!(FitError::SingularMatrix.fallback_line().is_none());
    }
}
