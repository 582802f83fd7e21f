use crate::models::audio_models::AudioLevels;
use crate::models::error::CaptureError;
use crate::models::events::{Notice, Preview};
use crate::models::recording_result::RecordingOutcome;
use crate::models::state::CaptureState;

/// Event delegate for capture session notifications.
///
/// Methods are called from whichever thread drove the change: the caller of
/// `start`/`stop`, the timer thread, the meter thread, or the platform thread
/// that reported a track end. No session lock is held during a callback.
/// Implementations should marshal to the UI thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: CaptureState, previous: CaptureState);

    /// Called once per countdown step with the number still to go (3, 2, 1).
    fn on_countdown(&self, _remaining: u8) {}

    /// Called every elapsed-counter tick while recording.
    fn on_elapsed(&self, _elapsed_secs: u64) {}

    /// Called periodically with updated audio levels.
    fn on_levels_updated(&self, _levels: &AudioLevels) {}

    fn on_preview(&self, _preview: &Preview) {}

    fn on_notice(&self, _notice: &Notice) {}

    /// Called when a start attempt fails, after cleanup.
    fn on_error(&self, _error: &CaptureError) {}

    /// Called when the artifact for a session has been assembled.
    fn on_capture_finished(&self, _outcome: &RecordingOutcome) {}
}
