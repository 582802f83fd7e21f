use crate::models::config::{CameraConstraints, DisplayConstraints};
use crate::models::error::CaptureError;
use crate::traits::media::MediaStream;

/// Platform source of display, microphone and camera streams.
///
/// Implemented by the embedding platform (browser bridge, desktop
/// capture backend). Each call may block on a user permission prompt.
pub trait CaptureProvider: Send + Sync {
    /// Acquire the display. Fails with `PermissionDenied` or
    /// `CaptureAborted` when the user declines the picker.
    fn get_display_media(
        &self,
        constraints: &DisplayConstraints,
        system_audio: bool,
    ) -> Result<MediaStream, CaptureError>;

    fn get_microphone(&self) -> Result<MediaStream, CaptureError>;

    fn get_camera(&self, constraints: &CameraConstraints) -> Result<MediaStream, CaptureError>;
}
