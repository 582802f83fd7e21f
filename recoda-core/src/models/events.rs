use crate::models::error::StoreError;
use crate::traits::media::MediaStream;

/// What the UI should currently show in the player area.
#[derive(Debug, Clone)]
pub enum Preview {
    /// The live display stream while capturing.
    LiveDisplay(MediaStream),
    /// Webcam overlay. `None` when the overlay is closed.
    Webcam(Option<MediaStream>),
    /// A finished recording, playable through its view handle.
    Recording { filename: String, view_url: Option<String> },
}

/// Informational events raised during a capture session.
///
/// None of these abort the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MicrophoneUnavailable(String),
    WebcamUnavailable(String),
    RecordingStarted,
    /// The recording is kept in memory but was not written to the local store.
    RecordingUnsaved(StoreError),
    RecordingReady { filename: String },
}

impl Notice {
    pub fn user_message(&self) -> String {
        match self {
            Self::MicrophoneUnavailable(_) => "Microphone denied, recording without mic.".to_string(),
            Self::WebcamUnavailable(_) => "Webcam not available.".to_string(),
            Self::RecordingStarted => "Recording started".to_string(),
            Self::RecordingUnsaved(_) => "Warning: recording not saved to local storage".to_string(),
            Self::RecordingReady { .. } => {
                "Recording ready. Play above or download from the list".to_string()
            }
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::RecordingUnsaved(_))
    }
}
