//! Parameter estimation.
//!
//! Responsibilities:
//!
//! - derive starting values and run the likelihood search (`fitter`)
//! - derivative-free simplex minimization (`optimizer`)

pub mod fitter;
pub mod optimizer;

pub use fitter::*;
pub use optimizer::*;
