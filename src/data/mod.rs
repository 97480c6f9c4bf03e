//! Data acquisition and preparation.
//!
//! - yearly downloads from the EIA API into a raw archive (`eia`)
//! - raw archive → canonical `id,date,price` table (`organize`)
//! - canonical table → sorted, complete model series (`prepare`)

pub mod eia;
pub mod organize;
pub mod prepare;

pub use eia::*;
pub use organize::*;
pub use prepare::{load_prepared, preprocess, write_prepared};
