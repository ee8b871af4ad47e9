//! Model representations consumed by calibration steps.
//!
//! Models are small, immutable values with pure evaluation functions so that
//! fitting code can produce them and callers can apply them without knowing
//! how they were obtained.

pub mod gaussian;
pub mod poly2d;

pub use gaussian::*;
pub use poly2d::*;
