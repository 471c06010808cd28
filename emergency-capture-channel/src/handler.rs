//! Method-channel handler.
//!
//! Thin dispatch layer over `EmergencySession`: decodes typed requests,
//! delegates to the engine, and converts every internal failure into a
//! status value. Nothing crossing this boundary is fatal to the host.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};

use emergency_capture_core::models::error::CaptureError;
use emergency_capture_core::session::emergency::EmergencySession;
use emergency_capture_core::traits::capture_device::CaptureBackend;
use emergency_capture_core::traits::platform::{PermissionBridge, PlatformProbe};

use crate::schema::{
    ChannelRequest, ChannelResponse, ConfigurePlatformArgs, DecodeError, ForcePermissionArgs,
    StartRecordingArgs, TestEmergencyAccessArgs,
};

/// Permission name queried for the diagnostics `recordAudio` flag.
pub const PERMISSION_RECORD_AUDIO: &str = "RECORD_AUDIO";

/// Permission name queried for the diagnostics `writeStorage` flag.
pub const PERMISSION_WRITE_STORAGE: &str = "WRITE_EXTERNAL_STORAGE";

/// Channel-facing handler owning the capture engine and platform bridges.
pub struct ChannelHandler<B, P>
where
    B: CaptureBackend,
    P: PermissionBridge + PlatformProbe,
{
    session: EmergencySession<B>,
    platform: P,
    emergency_mode: bool,
    bypass_system_blocks: bool,
}

impl<B, P> ChannelHandler<B, P>
where
    B: CaptureBackend,
    P: PermissionBridge + PlatformProbe,
{
    pub fn new(backend: B, platform: P) -> Self {
        Self {
            session: EmergencySession::new(backend),
            platform,
            emergency_mode: false,
            bypass_system_blocks: false,
        }
    }

    /// Entry point for the transport: raw `(method, arguments)` in, one
    /// response value out.
    pub fn handle(&mut self, method: &str, args: Value) -> ChannelResponse {
        let request = match ChannelRequest::decode(method, args) {
            Ok(request) => request,
            Err(DecodeError::UnknownMethod(name)) => {
                log::warn!("unknown channel method: {}", name);
                return ChannelResponse::NotImplemented;
            }
            Err(err) => return ChannelResponse::error(err),
        };
        self.dispatch(request)
    }

    pub fn dispatch(&mut self, request: ChannelRequest) -> ChannelResponse {
        match request {
            ChannelRequest::ForcePermission(args) => self.force_permission(args),
            ChannelRequest::ConfigurePlatform(args) => self.configure_platform(args),
            ChannelRequest::TestEmergencyAccess(args) => self.test_emergency_access(args),
            ChannelRequest::StartRecording(args) => self.start_recording(args),
            ChannelRequest::StopRecording => self.stop_recording(),
            ChannelRequest::GetDiagnosticInfo => self.diagnostic_info(),
        }
    }

    /// Best-effort permission workaround: report granted, or attempt an
    /// out-of-band grant and report how far it got.
    fn force_permission(&self, args: ForcePermissionArgs) -> ChannelResponse {
        if self.platform.check(&args.permission) {
            return ChannelResponse::status("ALREADY_GRANTED");
        }

        match self.platform.escalate(&args.permission) {
            Ok(()) => ChannelResponse::status("REFLECTION_ATTEMPTED"),
            Err(CaptureError::PermissionDenied) => ChannelResponse::status("REFLECTION_FAILED"),
            Err(err) => {
                log::error!("permission escalation failed for {}: {}", args.permission, err);
                ChannelResponse::error(err)
            }
        }
    }

    fn configure_platform(&mut self, args: ConfigurePlatformArgs) -> ChannelResponse {
        let mut config = self.session.config().clone();
        if let Some(rate) = args.sample_rate {
            config.sample_rate = rate;
        }
        if let Err(err) = self.session.configure(config) {
            return ChannelResponse::error(err);
        }

        self.emergency_mode = args.emergency_mode.unwrap_or(self.emergency_mode);
        self.bypass_system_blocks = args.bypass_system_blocks.unwrap_or(self.bypass_system_blocks);
        if self.emergency_mode && self.bypass_system_blocks {
            log::debug!("emergency bypass configuration active");
        }

        ChannelResponse::status("SUCCESS")
    }

    fn test_emergency_access(&mut self, args: TestEmergencyAccessArgs) -> ChannelResponse {
        let probe = self.session.probe(Duration::from_millis(args.duration_ms));
        match serde_json::to_value(&probe) {
            Ok(payload) => ChannelResponse::Payload(payload),
            Err(err) => ChannelResponse::error(err),
        }
    }

    fn start_recording(&mut self, args: StartRecordingArgs) -> ChannelResponse {
        let output_path = PathBuf::from(args.output_path);
        let max_duration = Duration::from_millis(args.max_duration_ms);

        match self.session.start(output_path, max_duration) {
            Ok(()) => ChannelResponse::status("SUCCESS"),
            Err(CaptureError::AlreadyRecording) => ChannelResponse::status("ALREADY_RECORDING"),
            Err(err) => ChannelResponse::error(err),
        }
    }

    fn stop_recording(&mut self) -> ChannelResponse {
        match self.session.stop() {
            Ok(()) => ChannelResponse::status("SUCCESS"),
            Err(err) => ChannelResponse::error(err),
        }
    }

    fn diagnostic_info(&self) -> ChannelResponse {
        let config = self.session.config();
        let min_buffer_size = match self.session.min_buffer_size() {
            Ok(size) => size,
            Err(err) => {
                log::warn!("minimum buffer size unavailable: {}", err);
                0
            }
        };

        let mut info = json!({
            "platformVersion": self.platform.platform_version(),
            "deviceModel": self.platform.device_model(),
            "manufacturer": self.platform.manufacturer(),
            "isRecording": self.session.is_recording(),
            "minBufferSize": min_buffer_size,
            "sampleRate": config.sample_rate,
            "permissions": {
                "recordAudio": self.platform.check(PERMISSION_RECORD_AUDIO),
                "writeStorage": self.platform.check(PERMISSION_WRITE_STORAGE),
            },
        });

        if let Some(source) = self.session.selected_source() {
            info["selectedSource"] = json!(source);
        }
        if let Some(err) = self.session.last_error() {
            info["lastError"] = json!(err.to_string());
        }

        ChannelResponse::Payload(info)
    }

    /// Direct access to the engine, for hosts that bypass the channel.
    pub fn session(&self) -> &EmergencySession<B> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EmergencySession<B> {
        &mut self.session
    }
}
