use thiserror::Error;

/// Errors that can occur during emergency capture operations.
///
/// None of these are fatal to the host: the channel layer converts every
/// variant into a status string at the boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("no capture source could be initialized")]
    DeviceUnavailable,

    #[error("a recording session is already active")]
    AlreadyRecording,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("i/o failure: {0}")]
    Io(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Io(err.to_string())
    }
}
