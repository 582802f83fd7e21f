use std::fmt;
use std::sync::Arc;

use crate::models::audio_models::TrackKind;

/// Callback fired when a track ends outside our control
/// (e.g. the user revokes screen sharing from the system UI).
pub type EndedCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// A single live media track handed out by the platform.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> String;

    fn kind(&self) -> TrackKind;

    /// Stop the track and release the underlying device. Idempotent.
    fn stop(&self);

    fn is_live(&self) -> bool;

    /// Register a listener for external end-of-track.
    fn on_ended(&self, callback: EndedCallback);
}

/// A bundle of tracks that travel together.
#[derive(Clone, Default)]
pub struct MediaStream {
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.of_kind(TrackKind::Video)
    }

    pub fn audio_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.of_kind(TrackKind::Audio)
    }

    pub fn has_audio(&self) -> bool {
        self.tracks.iter().any(|t| t.kind() == TrackKind::Audio)
    }

    /// A stream holding only this stream's audio tracks.
    pub fn audio_only(&self) -> MediaStream {
        MediaStream::new(self.audio_tracks())
    }

    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    fn of_kind(&self, kind: TrackKind) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(|t| t.kind() == kind).cloned().collect()
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tracks.iter().map(|t| (t.kind(), t.id())))
            .finish()
    }
}
