//! Raw JSON archive: one slot per requested year, `null` for a failed fetch.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::AppError;

/// Write the archive, replacing any existing file. Parent directories are created.
pub fn write_archive(path: &Path, slots: &[Option<Value>]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let json = serde_json::to_string(slots)
        .map_err(|e| AppError::io(format!("Failed to serialize raw archive: {e}")))?;
    fs::write(path, json)
        .map_err(|e| AppError::io(format!("Failed to write raw archive '{}': {e}", path.display())))
}

pub fn read_archive(path: &Path) -> Result<Vec<Option<Value>>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read raw archive '{}': {e}", path.display())))?;
    parse_archive(&text).map_err(|e| AppError::malformed(format!("'{}': {}", path.display(), e.message())))
}

/// Parse archive text. The top level must be a JSON array.
pub fn parse_archive(text: &str) -> Result<Vec<Option<Value>>, AppError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| AppError::malformed(format!("invalid JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| if item.is_null() { None } else { Some(item) })
            .collect()),
        other => Err(AppError::malformed(format!(
            "raw archive must be a JSON array, found {}",
            json_kind(&other)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn null_slots_survive_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.json");
        let slots = vec![Some(json!({"response": {"data": []}})), None];
        write_archive(&path, &slots).unwrap();
        assert_eq!(read_archive(&path).unwrap(), slots);
    }

    #[test]
    fn non_array_top_level_is_malformed() {
        let err = parse_archive(r#"{"response": {}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.message().contains("an object"));
    }

    #[test]
    fn broken_json_is_malformed() {
        assert_eq!(parse_archive("[1, ").unwrap_err().kind(), ErrorKind::MalformedInput);
    }
}
