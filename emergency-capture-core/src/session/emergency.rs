use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::config::{CaptureConfig, CaptureSource};
use crate::models::error::CaptureError;
use crate::models::state::CaptureState;
use crate::models::summary::RecordingSummary;
use crate::models::verdict::{AccessProbe, SignalThresholds};
use crate::processing::signal;
use crate::session::acquire::acquire_device;
use crate::storage::sidecar;
use crate::storage::wav_writer::WavFileWriter;
use crate::traits::capture_device::{CaptureBackend, CaptureDevice};

/// Pause between device reads so the loop does not busy-spin when the
/// device under-delivers.
const READ_INTERVAL: Duration = Duration::from_millis(10);

/// How long `stop()` waits for the sampling loop before abandoning it.
/// Forcibly killing the thread mid-write risks a corrupt file, so past
/// this deadline the loop is left to wind down on its own.
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Control messages into the sampling loop.
enum ControlMessage {
    Stop,
}

/// Internal mutable session state, protected by `parking_lot::Mutex`.
struct SessionShared {
    state: CaptureState,
    last_error: Option<CaptureError>,
    last_summary: Option<RecordingSummary>,
    selected_source: Option<CaptureSource>,
    bytes_written: u64,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            last_error: None,
            last_summary: None,
            selected_source: None,
            bytes_written: 0,
        }
    }
}

/// Emergency capture session orchestrator.
///
/// Owns the capture device lifecycle, the single background sampling
/// thread, WAV framing, and signal-presence classification. Generic over
/// the platform backend via the `CaptureBackend` trait.
///
/// At most one sampling thread exists at a time: `start()` while a session
/// is active is rejected, not queued. Once recording begins, the device is
/// owned exclusively by the sampling thread; the control side only sends a
/// `Stop` message and waits, bounded, for the loop to notice.
pub struct EmergencySession<B: CaptureBackend> {
    backend: B,
    config: CaptureConfig,
    thresholds: SignalThresholds,
    shared: Arc<Mutex<SessionShared>>,
    control: Option<Sender<ControlMessage>>,
    completion: Option<Receiver<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<B: CaptureBackend> EmergencySession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: CaptureConfig::default(),
            thresholds: SignalThresholds::default(),
            shared: Arc::new(Mutex::new(SessionShared::new())),
            control: None,
            completion: None,
            worker: None,
        }
    }

    pub fn with_config(backend: B, config: CaptureConfig, thresholds: SignalThresholds) -> Self {
        let mut session = Self::new(backend);
        session.config = config;
        session.thresholds = thresholds;
        session
    }

    /// Replace the session configuration. Only allowed while no session is
    /// active.
    pub fn configure(&mut self, config: CaptureConfig) -> Result<(), CaptureError> {
        if !self.shared.lock().state.can_start() {
            return Err(CaptureError::AlreadyRecording);
        }
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        self.shared.lock().state.clone()
    }

    pub fn is_recording(&self) -> bool {
        matches!(
            self.shared.lock().state,
            CaptureState::Starting | CaptureState::Recording | CaptureState::Stopping
        )
    }

    /// The I/O or device error that ended the last session, if any.
    pub fn last_error(&self) -> Option<CaptureError> {
        let shared = self.shared.lock();
        shared
            .last_error
            .clone()
            .or_else(|| shared.state.failure().cloned())
    }

    /// Summary of the last recording that finalized cleanly.
    pub fn last_summary(&self) -> Option<RecordingSummary> {
        self.shared.lock().last_summary.clone()
    }

    /// The source hint that produced the current or most recent device.
    pub fn selected_source(&self) -> Option<CaptureSource> {
        self.shared.lock().selected_source
    }

    /// PCM bytes written by the current or most recent session.
    pub fn bytes_written(&self) -> u64 {
        self.shared.lock().bytes_written
    }

    /// Platform minimum read-buffer size for the current configuration.
    pub fn min_buffer_size(&self) -> Result<usize, CaptureError> {
        self.backend.min_buffer_size(&self.config)
    }

    /// Start a recording session writing to `output_path`, returning as
    /// soon as the sampling thread is running.
    ///
    /// The session ends on `stop()`, after `max_duration` of wall-clock
    /// time, or when the device stops capturing, whichever comes first.
    pub fn start(&mut self, output_path: PathBuf, max_duration: Duration) -> Result<(), CaptureError> {
        {
            let mut shared = self.shared.lock();
            if !shared.state.can_start() {
                return Err(CaptureError::AlreadyRecording);
            }
            shared.state = CaptureState::Starting;
            shared.last_error = None;
            shared.last_summary = None;
            shared.selected_source = None;
            shared.bytes_written = 0;
        }
        self.reap_worker();

        match self.spawn_session(output_path, max_duration) {
            Ok(()) => Ok(()),
            Err(err) => {
                let mut shared = self.shared.lock();
                shared.state = CaptureState::Failed(err.clone());
                shared.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn spawn_session(&mut self, output_path: PathBuf, max_duration: Duration) -> Result<(), CaptureError> {
        self.config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let min_buffer = self.backend.min_buffer_size(&self.config)?;
        let buffer_size = min_buffer * self.config.buffer_size_factor;

        let (mut device, source) = acquire_device(&self.backend, &self.config, buffer_size)?;
        device.start()?;

        let (control_tx, control_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();

        // Transition to Recording before the thread exists: a loop that
        // exits instantly must never have its terminal state overwritten
        // by a later write from this side.
        {
            let mut guard = self.shared.lock();
            guard.selected_source = Some(source);
            guard.state = CaptureState::Recording;
        }

        let handle = thread::Builder::new()
            .name("emergency-capture".into())
            .spawn(move || {
                capture_loop(
                    device,
                    source,
                    config,
                    output_path,
                    max_duration,
                    buffer_size,
                    shared,
                    control_rx,
                );
                let _ = done_tx.send(());
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn capture thread: {}", e)))?;

        self.control = Some(control_tx);
        self.completion = Some(done_rx);
        self.worker = Some(handle);
        Ok(())
    }

    /// Stop the active session, waiting up to one second for the sampling
    /// loop to finalize the file.
    ///
    /// Safe no-op when no session is active. If the loop has not exited by
    /// the deadline it is abandoned, not killed; it still finalizes the
    /// file on its own exit, and `start()` stays rejected until then.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        let control = match self.control.take() {
            Some(control) => control,
            None => return Ok(()),
        };

        // The loop may already have exited on its own; a dead channel is
        // not an error here.
        let _ = control.send(ControlMessage::Stop);

        if let Some(done) = self.completion.take() {
            match done.recv_timeout(STOP_JOIN_TIMEOUT) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    self.reap_worker();
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("sampling loop did not exit within {:?}; abandoning join", STOP_JOIN_TIMEOUT);
                }
            }
        }
        Ok(())
    }

    /// One-shot capture-and-classify diagnostic (no file output).
    ///
    /// Blocks for `duration`, then performs a single read and classifies
    /// it. Rejected while a session is recording, since the device is
    /// exclusively owned by the sampling loop.
    pub fn probe(&self, duration: Duration) -> AccessProbe {
        if self.is_recording() {
            return AccessProbe::failed(CaptureError::AlreadyRecording.to_string());
        }

        let buffer_size = match self.backend.min_buffer_size(&self.config) {
            Ok(size) => size,
            Err(err) => return AccessProbe::failed(err.to_string()),
        };

        let (mut device, source) = match acquire_device(&self.backend, &self.config, buffer_size) {
            Ok(acquired) => acquired,
            Err(err) => return AccessProbe::failed(err.to_string()),
        };

        if let Err(err) = device.start() {
            return AccessProbe::failed(err.to_string());
        }

        thread::sleep(duration);

        let mut buffer = vec![0u8; buffer_size];
        let bytes_read = match device.read(&mut buffer) {
            Ok(n) => n,
            Err(err) => {
                device.stop();
                return AccessProbe::failed(err.to_string());
            }
        };
        device.stop();

        let verdict = signal::classify(&buffer, bytes_read, &self.thresholds);
        log::debug!(
            "access probe: {} bytes via {}, has_signal={}",
            bytes_read,
            source,
            verdict.has_signal
        );

        AccessProbe {
            bytes_recorded: bytes_read,
            has_audio_data: verdict.has_signal,
            buffer_size,
            peak_amplitude: verdict.peak_amplitude,
            activity_ratio: verdict.activity_ratio,
            source: Some(source),
            error: None,
        }
    }

    /// Join a worker thread that has already signalled completion.
    fn reap_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        self.completion = None;
        self.control = None;
    }
}

impl<B: CaptureBackend> Drop for EmergencySession<B> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Background sampling loop: provisional header, read/append until a stop
/// condition, then patch the header with the final byte count.
///
/// Exit conditions: `Stop` message received (or the control side went
/// away), `max_duration` of wall-clock time elapsed, the device stopped
/// capturing, or an I/O failure. I/O failures are logged and terminate the
/// session; they are not retried.
#[allow(clippy::too_many_arguments)]
fn capture_loop(
    mut device: Box<dyn CaptureDevice>,
    source: CaptureSource,
    config: CaptureConfig,
    output_path: PathBuf,
    max_duration: Duration,
    buffer_size: usize,
    shared: Arc<Mutex<SessionShared>>,
    control: Receiver<ControlMessage>,
) {
    let started = Instant::now();
    let mut writer = WavFileWriter::new(output_path.clone());
    let mut failure: Option<CaptureError> = None;
    let mut opened = false;

    match writer.open(&config) {
        Ok(()) => opened = true,
        Err(err) => failure = Some(err),
    }

    if opened {
        let mut buffer = vec![0u8; buffer_size];
        loop {
            match control.try_recv() {
                Ok(ControlMessage::Stop) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }
            if started.elapsed() >= max_duration {
                break;
            }
            if !device.is_capturing() {
                break;
            }

            match device.read(&mut buffer) {
                Ok(0) => {}
                Ok(n) => {
                    if let Err(err) = writer.write(&buffer[..n]) {
                        failure = Some(err);
                        break;
                    }
                    shared.lock().bytes_written = writer.data_bytes_written();
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }

            thread::sleep(READ_INTERVAL);
        }
    }

    device.stop();
    shared.lock().state = CaptureState::Stopping;

    // Patch the header with whatever made it to disk, even after a failed
    // read; only a writer that never opened is skipped.
    let finalized = if opened {
        match writer.finalize() {
            Ok(done) => Some(done),
            Err(err) => {
                if failure.is_none() {
                    failure = Some(err);
                }
                None
            }
        }
    } else {
        None
    };

    let duration_secs = started.elapsed().as_secs_f64();

    match failure {
        None => {
            let (data_bytes, checksum) = finalized.unwrap_or((0, String::new()));
            log::debug!("recording finished: {} PCM bytes in {:.2}s", data_bytes, duration_secs);

            let summary = RecordingSummary::new(
                &output_path.to_string_lossy(),
                data_bytes,
                duration_secs,
                source,
                &checksum,
            );
            if let Err(err) = sidecar::write_summary(&summary, &output_path) {
                log::warn!("failed to write recording summary sidecar: {}", err);
            }

            let mut guard = shared.lock();
            guard.last_summary = Some(summary);
            guard.state = CaptureState::Idle;
        }
        Some(err) => {
            log::error!("recording session failed: {}", err);
            let mut guard = shared.lock();
            guard.last_error = Some(err.clone());
            guard.state = CaptureState::Failed(err);
        }
    }
}
