//! JSON export of captured requests.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::request::RequestRecord;

/// Prefix of exported snapshot files.
const EXPORT_FILE_PREFIX: &str = "network-requests";

/// Pretty-printed JSON array of records.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(records: &[RequestRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Pretty-printed JSON of a single record.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn record_to_json(record: &RequestRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// File name used for a snapshot exported now.
#[must_use]
pub fn export_file_name() -> String {
    format!("{EXPORT_FILE_PREFIX}-{}.json", Utc::now().timestamp_millis())
}

/// Write `records` to a new file in `dir`, creating the directory if needed.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written.
pub fn export_snapshot(records: &[RequestRecord], dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let path = dir.join(export_file_name());
    std::fs::write(&path, to_json(records)?)?;

    info!(records = records.len(), "Exported requests to {}", path.display());
    Ok(path)
}
