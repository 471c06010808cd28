use std::fmt;

use serde::{Deserialize, Serialize};

/// Capture source hint passed to the platform backend.
///
/// Ordered fallback list: restrictive permission policies can block sources
/// independently, so trying a recognition- or camcorder-tuned source after
/// the primary microphone materially improves success odds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    Microphone,
    VoiceRecognition,
    Camcorder,
}

impl CaptureSource {
    /// Default acquisition order: primary mic first, camcorder last.
    pub const FALLBACK_ORDER: [CaptureSource; 3] = [
        CaptureSource::Microphone,
        CaptureSource::VoiceRecognition,
        CaptureSource::Camcorder,
    ];
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureSource::Microphone => "microphone",
            CaptureSource::VoiceRecognition => "voice_recognition",
            CaptureSource::Camcorder => "camcorder",
        };
        f.write_str(name)
    }
}

/// Immutable per-session capture parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Sample rate in Hz (default: 16000).
    pub sample_rate: u32,

    /// Number of channels (default: 1, mono).
    pub channels: u16,

    /// Bit depth for PCM output (default: 16). Only 16 is supported.
    pub bits_per_sample: u16,

    /// Capture source hints, tried in order until one initializes.
    pub source_fallbacks: Vec<CaptureSource>,

    /// Read buffer size = backend minimum buffer size × this factor.
    pub buffer_size_factor: usize,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels != 1 {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.bits_per_sample != 16 {
            return Err(format!("unsupported bit depth: {}", self.bits_per_sample));
        }
        if self.source_fallbacks.is_empty() {
            return Err("at least one capture source hint is required".into());
        }
        if self.buffer_size_factor == 0 {
            return Err("buffer size factor must be at least 1".into());
        }
        Ok(())
    }

    /// Bytes per second of PCM at this configuration.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bits_per_sample as u32 / 8
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            bits_per_sample: 16,
            source_fallbacks: CaptureSource::FALLBACK_ORDER.to_vec(),
            buffer_size_factor: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CaptureConfig::default().validate().is_ok());
    }

    #[test]
    fn default_byte_rate_is_32k() {
        // 16000 Hz * 1 channel * 2 bytes
        assert_eq!(CaptureConfig::default().byte_rate(), 32_000);
    }

    #[test]
    fn rejects_stereo() {
        let config = CaptureConfig {
            channels: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_fallback_list() {
        let config = CaptureConfig {
            source_fallbacks: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
