//! `nir-fit` library crate.
//!
//! Numerical fitting for near-infrared spectrograph calibration: dense
//! least squares, polynomial and Legendre fits, 2-D polynomial surfaces
//! with term selection, outlier-resistant line fits, and a downhill simplex
//! minimizer with a Gaussian profile fit on top.
//!
//! The binary (`nirfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fitting modules can be used directly from calibration code

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
