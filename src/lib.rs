//! `brent-forecast` library crate.
//!
//! The binary (`brent`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline steps (fetch, organize, prepare, fit, forecast) are reusable
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
