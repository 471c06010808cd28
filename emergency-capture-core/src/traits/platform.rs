use crate::models::error::CaptureError;

/// Opaque handle to the OS permission system.
///
/// The core only asks two questions; no permission-model redesign lives
/// behind this trait. `escalate` is the best-effort workaround hook for
/// OS builds that block the normal grant path — failure is reported as a
/// status, never treated as fatal.
pub trait PermissionBridge: Send + Sync {
    /// Whether `permission` is currently granted.
    fn check(&self, permission: &str) -> bool;

    /// Attempt a best-effort out-of-band grant of `permission`.
    ///
    /// `Ok(())` means the attempt was made, not that it succeeded;
    /// `Err(PermissionDenied)` means the platform declined outright.
    fn escalate(&self, permission: &str) -> Result<(), CaptureError>;
}

/// Platform identity strings for diagnostics.
pub trait PlatformProbe: Send + Sync {
    fn platform_version(&self) -> String;
    fn device_model(&self) -> String;
    fn manufacturer(&self) -> String;
}
