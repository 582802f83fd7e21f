use crate::models::artifact::{Artifact, ArtifactId};
use crate::models::error::StoreError;
use crate::storage::views::BlobView;

/// An artifact loaded from the store with a fresh playback handle.
///
/// The caller owns `view`; dropping it releases the handle.
#[derive(Debug)]
pub struct LoadedArtifact {
    pub artifact: Artifact,
    pub view: Option<BlobView>,
}

/// Durable storage for recording artifacts.
///
/// Implementations must be safe to call from several threads; conflicting
/// writes to the same key are serialized, last writer wins.
pub trait ArtifactStore: Send + Sync {
    /// Persist a new artifact and return its fresh id.
    fn save(&self, artifact: &Artifact) -> Result<ArtifactId, StoreError>;

    /// Remove every artifact with the same filename, then save.
    fn put_unique(&self, artifact: &Artifact) -> Result<ArtifactId, StoreError>;

    /// All artifacts, newest first.
    fn load_all(&self) -> Result<Vec<LoadedArtifact>, StoreError>;

    /// Absent ids are a no-op.
    fn delete(&self, id: ArtifactId) -> Result<(), StoreError>;

    /// Idempotent. Absent ids are a no-op.
    fn mark_synced(&self, id: ArtifactId) -> Result<(), StoreError>;

    fn exists(&self, filename: &str) -> Result<bool, StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}
