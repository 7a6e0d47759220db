use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Provenance record written next to an output image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditMetadata {
    pub source: Option<String>,
    pub operations: Vec<String>,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub format: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

pub fn sidecar_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("json")
}

/// Write `metadata` as pretty JSON beside `output_path` (same stem, `.json`).
pub fn create_metadata_sidecar(output_path: &Path, metadata: &EditMetadata) -> Result<PathBuf> {
    let path = sidecar_path(output_path);
    let json_string = serde_json::to_string_pretty(metadata)?;
    std::fs::write(&path, json_string)?;
    info!("Created metadata sidecar: {:?}", path);
    Ok(path)
}
