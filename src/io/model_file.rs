//! Binary model file.
//!
//! Layout:
//!
//! ```text
//! b"BRFM" | bincode(StoredModel)
//! ```
//!
//! `StoredModel` carries the file format version and the hyperparameters as
//! plain fields. The fitted state, when present, is a separately versioned
//! bincode blob so it can evolve without touching the outer layout.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{Order, SeasonalOrder, Trend};
use crate::error::AppError;

pub const MODEL_MAGIC: &[u8; 4] = b"BRFM";
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Outer record of a model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredModel {
    pub format_version: u32,
    pub order: Order,
    pub seasonal_order: SeasonalOrder,
    pub trend: Option<Trend>,
    /// Absent for a model that was saved before fitting.
    pub fitted: Option<FittedBlob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedBlob {
    pub version: u32,
    pub bytes: Vec<u8>,
}

impl FittedBlob {
    pub fn encode<T: Serialize>(version: u32, state: &T) -> Result<Self, AppError> {
        let bytes = bincode::serialize(state)
            .map_err(|e| AppError::io(format!("Failed to encode fitted model state: {e}")))?;
        Ok(Self { version, bytes })
    }

    /// Decode, rejecting blobs written by a different state version.
    pub fn decode<T: DeserializeOwned>(&self, expected_version: u32) -> Result<T, AppError> {
        if self.version != expected_version {
            return Err(AppError::malformed(format!(
                "Unsupported fitted-state version {} (expected {expected_version}).",
                self.version
            )));
        }
        bincode::deserialize(&self.bytes)
            .map_err(|e| AppError::malformed(format!("Corrupt fitted model state: {e}")))
    }
}

/// Write a model file, replacing any existing file. Parent directories are created.
pub fn write_model(path: &Path, model: &StoredModel) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let body = bincode::serialize(model)
        .map_err(|e| AppError::io(format!("Failed to encode model: {e}")))?;

    let mut bytes = Vec::with_capacity(MODEL_MAGIC.len() + body.len());
    bytes.extend_from_slice(MODEL_MAGIC);
    bytes.extend_from_slice(&body);
    fs::write(path, bytes)
        .map_err(|e| AppError::io(format!("Failed to write model file '{}': {e}", path.display())))
}

pub fn read_model(path: &Path) -> Result<StoredModel, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::io(format!("Failed to read model file '{}': {e}", path.display())))?;
    decode_model(&bytes).map_err(|e| AppError::malformed(format!("'{}': {}", path.display(), e.message())))
}

fn decode_model(bytes: &[u8]) -> Result<StoredModel, AppError> {
    let Some(body) = bytes.strip_prefix(MODEL_MAGIC.as_slice()) else {
        return Err(AppError::malformed("not a model file (bad magic bytes)"));
    };
    let model: StoredModel = bincode::deserialize(body)
        .map_err(|e| AppError::malformed(format!("corrupt model file: {e}")))?;
    if model.format_version != MODEL_FORMAT_VERSION {
        return Err(AppError::malformed(format!(
            "unsupported model file version {} (expected {MODEL_FORMAT_VERSION})",
            model.format_version
        )));
    }
    Ok(model)
}
