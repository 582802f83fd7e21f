use bytes::Bytes;

use crate::models::artifact::Artifact;
use crate::models::error::SyncError;
use crate::models::remote::{
    CompanionRecording, DownloadedBlob, ManifestEntry, NewRecording, RemoteRecording, RemoteUser,
    SignedUpload, SyncPlan,
};

/// Source of the bearer token for remote calls.
pub trait SessionProvider: Send + Sync {
    /// `None` when nobody is signed in.
    fn access_token(&self) -> Option<String>;
}

/// Remote metadata table plus signed-URL issuance.
pub trait RemoteCollaborator: Send + Sync {
    fn current_user(&self, token: &str) -> Result<RemoteUser, SyncError>;

    fn list_recordings(&self, token: &str) -> Result<Vec<RemoteRecording>, SyncError>;

    fn register_recording(
        &self,
        token: &str,
        recording: &NewRecording,
    ) -> Result<RemoteRecording, SyncError>;

    /// Submit the local manifest and receive what each side is missing.
    fn diff(&self, token: &str, manifest: &[ManifestEntry]) -> Result<SyncPlan, SyncError>;

    fn sign_upload(&self, token: &str, filename: &str) -> Result<SignedUpload, SyncError>;
}

/// Direct object-store transfers through signed references.
pub trait SignedTransfer: Send + Sync {
    fn upload(&self, target: &SignedUpload, body: Bytes, content_type: &str)
        -> Result<(), SyncError>;

    fn download(&self, url: &str) -> Result<DownloadedBlob, SyncError>;
}

/// Optional local companion server that keeps recordings on disk.
pub trait CompanionServer: Send + Sync {
    fn list(&self, token: &str) -> Result<Vec<CompanionRecording>, SyncError>;

    fn fetch(&self, token: &str, filename: &str) -> Result<DownloadedBlob, SyncError>;

    fn save(&self, token: &str, artifact: &Artifact, body: Bytes) -> Result<(), SyncError>;
}
