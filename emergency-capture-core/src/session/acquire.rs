//! Capture-device acquisition with ordered source fallback.

use crate::models::config::{CaptureConfig, CaptureSource};
use crate::models::error::CaptureError;
use crate::traits::capture_device::{CaptureBackend, CaptureDevice};

/// Try each source hint in `config.source_fallbacks` order and return the
/// first device that reaches an initialized state, together with the hint
/// that produced it.
///
/// A device that constructs but does not initialize is dropped (releasing
/// the platform handle) before the next hint is tried. All hints exhausted
/// means `DeviceUnavailable`; acquisition is never retried automatically.
pub fn acquire_device(
    backend: &dyn CaptureBackend,
    config: &CaptureConfig,
    buffer_size: usize,
) -> Result<(Box<dyn CaptureDevice>, CaptureSource), CaptureError> {
    for &source in &config.source_fallbacks {
        match backend.open(source, config, buffer_size) {
            Ok(device) if device.is_initialized() => {
                log::debug!("capture device initialized via source {}", source);
                return Ok((device, source));
            }
            Ok(_) => {
                log::warn!("capture source {} constructed but did not initialize", source);
            }
            Err(err) => {
                log::warn!("capture source {} unavailable: {}", source, err);
            }
        }
    }
    Err(CaptureError::DeviceUnavailable)
}
