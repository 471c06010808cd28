use super::error::CaptureError;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → starting → recording → stopping → idle
///           ↓           ↓
///         failed      failed
/// ```
///
/// `Failed` is reported until the next `start()`, which begins a fresh
/// session; there is no terminal lockout.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    Starting,
    Recording,
    Stopping,
    Failed(CaptureError),
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Whether a new session may start from this state.
    ///
    /// Only `Idle` and `Failed` qualify; everything else means a session
    /// is being set up, running, or torn down.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed(_))
    }

    /// The error that moved the session into `Failed`, if any.
    pub fn failure(&self) -> Option<&CaptureError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
