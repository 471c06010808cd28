//! # emergency-capture-core
//!
//! Platform-agnostic emergency audio capture core library.
//!
//! Provides ordered-fallback device acquisition, a single background
//! sampling loop with streaming WAV output, and signal-presence
//! classification. Platform-specific backends (e.g. an Android
//! `AudioRecord` wrapper) implement the `CaptureBackend`/`CaptureDevice`
//! traits and plug into the generic `EmergencySession`.
//!
//! ## Architecture
//!
//! ```text
//! emergency-capture-core (this crate)
//! ├── traits/       ← CaptureBackend, CaptureDevice, PermissionBridge, PlatformProbe
//! ├── models/       ← CaptureError, CaptureState, CaptureConfig, SignalVerdict, etc.
//! ├── processing/   ← WAV header generation/patching, signal classification
//! ├── session/      ← fallback acquisition, EmergencySession orchestrator
//! └── storage/      ← streaming WavFileWriter, summary sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{CaptureConfig, CaptureSource};
pub use models::error::CaptureError;
pub use models::state::CaptureState;
pub use models::summary::RecordingSummary;
pub use models::verdict::{AccessProbe, SignalThresholds, SignalVerdict};
pub use processing::signal::classify;
pub use session::acquire::acquire_device;
pub use session::emergency::EmergencySession;
pub use storage::wav_writer::WavFileWriter;
pub use traits::capture_device::{CaptureBackend, CaptureDevice};
pub use traits::platform::{PermissionBridge, PlatformProbe};
