//! Synthetic data sources.
//!
//! The core never reads data itself; these generators exist so the `demo`
//! command and the tests have reproducible inputs.

pub mod synthetic;

pub use synthetic::*;
