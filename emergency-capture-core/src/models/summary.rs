use serde::{Deserialize, Serialize};

use super::config::CaptureSource;

/// Summary of a finished recording session.
///
/// Serializable for JSON export as a sidecar next to the WAV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub id: String,
    pub file_path: String,
    /// PCM bytes written after the 44-byte header.
    pub data_bytes: u64,
    pub duration_secs: f64,
    /// The capture source that actually initialized, for debuggability.
    pub source: CaptureSource,
    /// SHA-256 hex digest of the finalized file.
    pub checksum: String,
    pub created_at: String,
}

impl RecordingSummary {
    pub fn new(
        file_path: &str,
        data_bytes: u64,
        duration_secs: f64,
        source: CaptureSource,
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            data_bytes,
            duration_secs,
            source,
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
