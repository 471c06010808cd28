//! Typed request/response schema for the method channel.
//!
//! Incoming calls arrive as `(method name, JSON arguments)`. Each method
//! has an explicit argument struct decoded with serde: a missing or
//! mistyped required field is a decode error, never a silently substituted
//! default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("invalid arguments for {method}: {message}")]
    InvalidArgs { method: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcePermissionArgs {
    pub permission: String,
}

/// All three fields are optional by contract; absent means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePlatformArgs {
    pub sample_rate: Option<u32>,
    pub emergency_mode: Option<bool>,
    pub bypass_system_blocks: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEmergencyAccessArgs {
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRecordingArgs {
    pub output_path: String,
    pub max_duration_ms: u64,
}

/// A decoded, validated method-channel request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelRequest {
    ForcePermission(ForcePermissionArgs),
    ConfigurePlatform(ConfigurePlatformArgs),
    TestEmergencyAccess(TestEmergencyAccessArgs),
    StartRecording(StartRecordingArgs),
    StopRecording,
    GetDiagnosticInfo,
}

impl ChannelRequest {
    /// Decode a raw `(method, arguments)` pair into a typed request.
    pub fn decode(method: &str, args: Value) -> Result<Self, DecodeError> {
        fn typed<T: serde::de::DeserializeOwned>(method: &str, args: Value) -> Result<T, DecodeError> {
            serde_json::from_value(args).map_err(|e| DecodeError::InvalidArgs {
                method: method.to_string(),
                message: e.to_string(),
            })
        }

        match method {
            "forcePermission" => Ok(Self::ForcePermission(typed(method, args)?)),
            "configurePlatform" => {
                // Null arguments are a valid "change nothing" call.
                if args.is_null() {
                    return Ok(Self::ConfigurePlatform(ConfigurePlatformArgs::default()));
                }
                Ok(Self::ConfigurePlatform(typed(method, args)?))
            }
            "testEmergencyAccess" => Ok(Self::TestEmergencyAccess(typed(method, args)?)),
            "startRecording" => Ok(Self::StartRecording(typed(method, args)?)),
            "stopRecording" => Ok(Self::StopRecording),
            "getDiagnosticInfo" => Ok(Self::GetDiagnosticInfo),
            other => Err(DecodeError::UnknownMethod(other.to_string())),
        }
    }
}

/// Response returned to the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChannelResponse {
    /// A plain status string (`"SUCCESS"`, `"ALREADY_RECORDING"`, ...).
    Status(String),
    /// A structured JSON payload (probe results, diagnostics).
    Payload(Value),
    /// The method is not part of this channel's surface; the transport
    /// maps this to its own "method not found" signal.
    NotImplemented,
}

impl ChannelResponse {
    pub fn status(value: impl Into<String>) -> Self {
        Self::Status(value.into())
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::Status(format!("ERROR: {}", message))
    }
}
