//! Signal-presence classification.
//!
//! Pure math over raw PCM bytes, no platform dependencies. Decides whether
//! a captured window is real signal or silence/noise floor using three
//! deliberately lenient criteria, because aggressive OS-side noise
//! suppression can squash peaks while sustained low-level speech remains.

use crate::models::verdict::{SignalThresholds, SignalVerdict};

/// Classify `buffer[..bytes_valid]` as 16-bit little-endian signed PCM.
///
/// A trailing odd byte is dropped. Zero valid bytes yields a negative
/// verdict with all scalars zero.
///
/// The verdict is positive if any of:
/// - at least one sample exceeds `thresholds.signal`,
/// - the peak amplitude exceeds `thresholds.peak`,
/// - the fraction of samples above `thresholds.active` exceeds
///   `thresholds.min_activity_ratio`.
pub fn classify(buffer: &[u8], bytes_valid: usize, thresholds: &SignalThresholds) -> SignalVerdict {
    let bytes_valid = bytes_valid.min(buffer.len());
    let sample_count = bytes_valid / 2;
    if sample_count == 0 {
        return SignalVerdict::default();
    }

    let mut over_signal = false;
    let mut peak: i32 = 0;
    let mut amplitude_sum: i64 = 0;
    let mut active: usize = 0;

    for pair in buffer[..sample_count * 2].chunks_exact(2) {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        let amplitude = (sample as i32).abs();

        if amplitude > peak {
            peak = amplitude;
        }
        amplitude_sum += amplitude as i64;

        if amplitude > thresholds.active {
            active += 1;
        }
        if amplitude > thresholds.signal {
            over_signal = true;
        }
    }

    let activity_ratio = active as f32 / sample_count as f32;
    let has_signal =
        over_signal || peak > thresholds.peak || activity_ratio > thresholds.min_activity_ratio;

    let verdict = SignalVerdict {
        has_signal,
        peak_amplitude: peak,
        mean_amplitude: amplitude_sum / sample_count as i64,
        activity_ratio,
        samples_analyzed: sample_count,
    };

    log::debug!(
        "signal analysis: peak={} mean={} active={}/{} ratio={:.1}% has_signal={}",
        verdict.peak_amplitude,
        verdict.mean_amplitude,
        active,
        sample_count,
        activity_ratio * 100.0,
        has_signal
    );

    verdict
}
