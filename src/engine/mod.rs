//! Image preparation engine
//!
//! Pure image operations applied to a design before it is uploaded.

pub mod fitter;

pub use fitter::{cover_exact, fit, FittedImage};
