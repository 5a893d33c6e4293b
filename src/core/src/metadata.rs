//! Layer metadata record patching.
//!
//! Each layer directory of a `docker save` bundle carries a `json` file
//! describing the layer. When a layer is retagged, that record's `id` must
//! follow, and callers may merge extra fields into it.

use serde_json::{Map, Value};

use crate::config::RetagConfig;
use crate::error::{Result, RetagError};
use crate::id::{ImageId, IMAGE_ID_LEN};

/// Name of the metadata file inside a layer directory.
pub const METADATA_FILE: &str = "json";

/// Outcome of a successful patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataPatch {
    /// `id` matched; overrides merged and `id` replaced
    Patched(Vec<u8>),
    /// `id` did not match; record re-encoded unchanged
    Reencoded(Vec<u8>),
}

impl MetadataPatch {
    pub fn bytes(&self) -> &[u8] {
        match self {
            MetadataPatch::Patched(b) | MetadataPatch::Reencoded(b) => b,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            MetadataPatch::Patched(b) | MetadataPatch::Reencoded(b) => b,
        }
    }

    pub fn is_patched(&self) -> bool {
        matches!(self, MetadataPatch::Patched(_))
    }
}

/// Whether an already-renamed member path is exactly `<new_id>/json`.
pub fn is_metadata_member(path: &[u8], new_id: &ImageId) -> bool {
    path.len() == IMAGE_ID_LEN + 1 + METADATA_FILE.len()
        && path.starts_with(new_id.as_bytes())
        && path[IMAGE_ID_LEN] == b'/'
        && &path[IMAGE_ID_LEN + 1..] == METADATA_FILE.as_bytes()
}

/// Decode `content` as a JSON object and patch it for `config`.
///
/// Errors mean the record should be passed through untouched.
pub fn patch_metadata(content: &[u8], config: &RetagConfig) -> Result<MetadataPatch> {
    let value: Value = serde_json::from_slice(content)
        .map_err(|e| RetagError::Metadata(format!("Failed to parse layer metadata: {e}")))?;

    let Value::Object(mut record) = value else {
        return Err(RetagError::Metadata(
            "Layer metadata is not a JSON object".to_string(),
        ));
    };

    let matched = config.old_id.matches(record_id(&record)?);

    if matched {
        merge_overrides(&mut record, config);
        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(pretty) = serde_json::to_string_pretty(&record) {
                tracing::debug!(record = %pretty, "Patched layer metadata");
            }
        }
    }

    let bytes = serde_json::to_vec(&Value::Object(record))?;
    Ok(if matched {
        MetadataPatch::Patched(bytes)
    } else {
        MetadataPatch::Reencoded(bytes)
    })
}

/// The record's `id`, empty when absent.
fn record_id(record: &Map<String, Value>) -> Result<&str> {
    match record.get("id") {
        None => Ok(""),
        Some(Value::String(id)) => Ok(id),
        Some(other) => Err(RetagError::Metadata(format!(
            "Layer metadata id is not a string: {other}"
        ))),
    }
}

fn merge_overrides(record: &mut Map<String, Value>, config: &RetagConfig) {
    for (key, value) in config.overrides.iter() {
        record.insert(key.to_string(), Value::String(value.to_string()));
    }
    record.insert(
        "id".to_string(),
        Value::String(config.new_id.as_str().to_string()),
    );
}
