//! Wire types exchanged with the remote collaborator and the companion server.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::Artifact;

/// One line of the local manifest sent to the diff endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/recordings/sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub local_recordings: Vec<ManifestEntry>,
}

/// Diff returned by the remote: what each side is missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncPlan {
    pub to_upload: Vec<UploadItem>,
    pub to_download: Vec<RemoteRecording>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_upload.is_empty() && self.to_download.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadItem {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A recording known to the remote metadata table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecording {
    pub filename: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Signed download reference, when the remote could issue one.
    #[serde(rename = "downloadUrl", default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Body of `POST /api/recordings`. Every field is required by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecording {
    pub filename: String,
    pub duration: u64,
    pub size: u64,
    pub mime_type: String,
}

impl From<&Artifact> for NewRecording {
    fn from(artifact: &Artifact) -> Self {
        Self {
            filename: artifact.filename.clone(),
            duration: artifact.duration_secs,
            size: artifact.size,
            mime_type: artifact.mime.clone(),
        }
    }
}

/// Response of `POST /api/upload/sign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUpload {
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Identity returned by `GET /api/auth/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Bytes fetched through a signed download reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedBlob {
    pub bytes: Bytes,
    /// `Content-Type` reported by the object store.
    pub content_type: Option<String>,
}

/// A recording kept by the local companion server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionRecording {
    pub filename: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub mime: Option<String>,
    pub ts: DateTime<Utc>,
    #[serde(default)]
    pub size: u64,
}
