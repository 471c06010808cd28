use std::fs;
use std::path::Path;

use crate::models::error::CaptureError;
use crate::models::summary::RecordingSummary;

/// Write a recording summary as a JSON sidecar file.
///
/// Creates `{recording_path}.summary.json` alongside the recording.
pub fn write_summary(summary: &RecordingSummary, recording_path: &Path) -> Result<(), CaptureError> {
    let sidecar_path = recording_path.with_extension("summary.json");
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| CaptureError::Io(format!("failed to serialize summary: {}", e)))?;
    fs::write(&sidecar_path, json)
        .map_err(|e| CaptureError::Io(format!("failed to write summary: {}", e)))?;
    Ok(())
}

/// Read a recording summary from a JSON sidecar file.
pub fn read_summary(recording_path: &Path) -> Result<RecordingSummary, CaptureError> {
    let sidecar_path = recording_path.with_extension("summary.json");
    let json = fs::read_to_string(&sidecar_path)
        .map_err(|e| CaptureError::Io(format!("failed to read summary: {}", e)))?;
    let summary: RecordingSummary = serde_json::from_str(&json)
        .map_err(|e| CaptureError::Io(format!("failed to parse summary: {}", e)))?;
    Ok(summary)
}
