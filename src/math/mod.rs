//! Mathematical utilities: least squares, lag polynomials, and the Kalman filter.

pub mod kalman;
pub mod ols;
pub mod poly;

pub use kalman::*;
pub use ols::*;
pub use poly::*;
