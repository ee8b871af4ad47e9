//! Input/output helpers.
//!
//! - CSV point files (`points`)
//! - `Poly2d` coefficient tables (`table`)
//! - JSON result exports (`export`)

pub mod export;
pub mod points;
pub mod table;

pub use export::*;
pub use points::*;
pub use table::*;
