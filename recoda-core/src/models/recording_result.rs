use uuid::Uuid;

use super::artifact::{Artifact, ArtifactId};
use super::error::StoreError;

/// Result of stopping a capture session.
///
/// Produced exactly once per session, whichever side initiated the stop.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingOutcome {
    pub session_id: Uuid,
    pub artifact: Artifact,
    /// Playback handle URL for the in-memory blob.
    pub view_url: Option<String>,
    /// Set when the store failed; the artifact is still in the library.
    pub persist_error: Option<StoreError>,
}

impl RecordingOutcome {
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }

    pub fn id(&self) -> Option<ArtifactId> {
        self.artifact.id
    }

    pub fn filename(&self) -> &str {
        &self.artifact.filename
    }
}
