//! Input/output helpers.
//!
//! - raw JSON archive read/write (`archive`)
//! - canonical and prepared CSV tables (`table`)
//! - forecast exports (`export`)
//! - binary model files (`model_file`)

pub mod archive;
pub mod export;
pub mod model_file;
pub mod table;

pub use archive::*;
pub use export::*;
pub use model_file::*;
pub use table::*;
