use crate::models::config::{CaptureConfig, CaptureSource};
use crate::models::error::CaptureError;

/// A constructed raw PCM capture device.
///
/// Owned exclusively by the background sampling loop once recording begins;
/// the control thread never touches it while recording is in progress.
/// Implementations wrap the platform's capture handle (e.g. an Android
/// `AudioRecord`) and release it on drop.
pub trait CaptureDevice: Send {
    /// Whether construction left the device in an initialized state.
    ///
    /// A device that failed to initialize must be dropped and the next
    /// source hint tried; it is never started.
    fn is_initialized(&self) -> bool;

    /// Begin delivering samples.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Blocking read of up to `buf.len()` bytes of 16-bit LE PCM.
    ///
    /// Timeout semantics are the platform's; a short read is not an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError>;

    /// Whether the device still reports it is capturing.
    ///
    /// The sampling loop exits when this goes false (device failure or
    /// OS-side revocation mid-session).
    fn is_capturing(&self) -> bool;

    /// Stop delivering samples. Safe to call more than once.
    fn stop(&mut self);
}

/// Platform factory for capture devices.
///
/// Implemented by per-OS backends outside this crate; the core stays
/// platform-free and generic over this trait.
pub trait CaptureBackend: Send + Sync {
    /// Minimum read-buffer size in bytes for this configuration, as
    /// reported by the platform.
    fn min_buffer_size(&self, config: &CaptureConfig) -> Result<usize, CaptureError>;

    /// Construct a device against one source hint.
    ///
    /// Returning `Ok` does not imply the device initialized; callers must
    /// check `is_initialized()` before starting it.
    fn open(
        &self,
        source: CaptureSource,
        config: &CaptureConfig,
        buffer_size: usize,
    ) -> Result<Box<dyn CaptureDevice>, CaptureError>;
}
