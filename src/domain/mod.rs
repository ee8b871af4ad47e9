//! Domain types used throughout the toolkit.
//!
//! This module defines:
//!
//! - the sample container (`PointSet3`)
//! - surface monomials (`Term`)
//! - fit outputs (`PolyFit`, `SurfaceFit`, `LineFit`, `GaussianFit`, etc.)
//! - per-command run configuration (`FitConfig`, `EvalConfig`, `DemoConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
