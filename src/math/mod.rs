//! Mathematical utilities: dense matrices, least squares, Legendre basis, order statistics.

pub mod legendre;
pub mod matrix;
pub mod ols;
pub mod stats;

pub use legendre::*;
pub use matrix::*;
pub use ols::*;
pub use stats::*;
