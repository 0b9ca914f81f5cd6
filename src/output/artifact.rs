use crate::records::BatchResult;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted record of one finished batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchArtifact {
    pub session_id: String,
    pub completed_at: DateTime<Utc>,
    pub url_count: usize,
    pub results: BatchResult,
}

/// Writes the batch artifact to `<dir>/<session-id>.json`
///
/// The filename is addressed by session id, so re-running a batch never
/// overwrites another session's results.
pub fn write_batch_artifact(dir: &Path, artifact: &BatchArtifact) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.json", artifact.session_id));
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(&path, json)?;

    tracing::info!("Batch artifact written to {}", path.display());
    Ok(path)
}

/// Writes any serializable value as pretty-printed JSON
///
/// Used by the single-URL CLI modes for their output files.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
