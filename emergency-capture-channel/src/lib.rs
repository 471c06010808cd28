//! # emergency-capture-channel
//!
//! Method-channel surface for `emergency-capture-core`.
//!
//! A host transport delivers `(method name, JSON arguments)` pairs; this
//! crate decodes them into a typed request schema, drives the capture
//! engine, and answers with status strings or JSON payloads. Every
//! internal failure is converted to a response at the boundary — nothing
//! in this layer is fatal to the host process.
//!
//! ## Surface
//!
//! | Method | Result |
//! |---|---|
//! | `forcePermission` | `ALREADY_GRANTED` / `REFLECTION_ATTEMPTED` / `REFLECTION_FAILED` / `ERROR: <msg>` |
//! | `configurePlatform` | `SUCCESS` / `ERROR: <msg>` |
//! | `testEmergencyAccess` | probe payload (`bytesRecorded`, `hasAudioData`, `bufferSize`, ...) |
//! | `startRecording` | `SUCCESS` / `ALREADY_RECORDING` / `ERROR: <msg>` |
//! | `stopRecording` | `SUCCESS` / `ERROR: <msg>` |
//! | `getDiagnosticInfo` | diagnostics payload |

pub mod handler;
pub mod schema;

pub use handler::{ChannelHandler, PERMISSION_RECORD_AUDIO, PERMISSION_WRITE_STORAGE};
pub use schema::{ChannelRequest, ChannelResponse, DecodeError};
