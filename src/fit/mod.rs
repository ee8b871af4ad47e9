//! Fitting routines.
//!
//! Responsibilities:
//!
//! - parse term-selection control strings (`terms`)
//! - polynomial, surface and Legendre least-squares fits (`poly`)
//! - ordinary and outlier-resistant line fits (`robust`)
//! - derivative-free minimization and the Gaussian fit built on it (`simplex`, `gaussian`)

pub mod gaussian;
pub mod poly;
pub mod robust;
pub mod simplex;
pub mod terms;

pub use gaussian::*;
pub use poly::*;
pub use robust::*;
pub use simplex::*;
pub use terms::*;
