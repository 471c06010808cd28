use serde::{Deserialize, Serialize};

use super::config::CaptureSource;

/// Amplitude thresholds for signal classification.
///
/// The defaults (5 / 15 / 10 / 0.05) are empirically chosen for devices
/// where OS-level noise suppression or gain restriction squashes peak
/// amplitude; they are configuration, not derived values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    /// A sample above this counts toward the activity ratio.
    pub active: i32,

    /// A single sample above this is enough to call the buffer signal.
    pub signal: i32,

    /// A peak above this is enough to call the buffer signal.
    pub peak: i32,

    /// An activity ratio above this is enough to call the buffer signal.
    /// Catches sustained low-level speech a single-threshold peak test
    /// would miss.
    pub min_activity_ratio: f32,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            active: 5,
            signal: 15,
            peak: 10,
            min_activity_ratio: 0.05,
        }
    }
}

/// Outcome of classifying one analysis window of PCM samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalVerdict {
    /// Whether the window looks like real signal rather than silence or
    /// noise floor.
    pub has_signal: bool,

    /// Maximum absolute sample amplitude seen.
    pub peak_amplitude: i32,

    /// Mean absolute sample amplitude.
    pub mean_amplitude: i64,

    /// Fraction of samples above the activity threshold, 0.0–1.0.
    pub activity_ratio: f32,

    /// Number of complete 16-bit samples analyzed.
    pub samples_analyzed: usize,
}

/// Result of a one-shot capture-and-classify diagnostic probe.
///
/// Always a value, never an error: a failed probe reports what went wrong
/// in `error` with zeroed counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessProbe {
    pub bytes_recorded: usize,
    pub has_audio_data: bool,
    pub buffer_size: usize,
    pub peak_amplitude: i32,
    pub activity_ratio: f32,
    /// The capture source that initialized for the probe, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CaptureSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AccessProbe {
    /// A probe that failed before any samples were read.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}
