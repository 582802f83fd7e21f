use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::artifact::{Artifact, ArtifactId, ArtifactPayload};
use crate::models::error::StoreError;

pub const STORE_VERSION: u32 = 1;

/// `store.json`: schema version and the id high-water mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreManifest {
    pub version: u32,
    pub next_id: u64,
}

impl Default for StoreManifest {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            next_id: 1,
        }
    }
}

/// One metadata row, stored as `records/<id>.json` next to `blobs/<id>.bin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: ArtifactId,
    pub filename: String,
    pub duration: u64,
    pub mime: String,
    pub ts: DateTime<Utc>,
    pub size: u64,
    pub synced: bool,
    /// SHA-256 hex digest of the blob.
    pub checksum: String,
}

impl StoredRecord {
    pub fn new(id: ArtifactId, artifact: &Artifact, checksum: String) -> Self {
        Self {
            id,
            filename: artifact.filename.clone(),
            duration: artifact.duration_secs,
            mime: artifact.mime.clone(),
            ts: artifact.created_at,
            size: artifact.size,
            synced: artifact.synced,
            checksum,
        }
    }

    pub fn into_artifact(self, blob: bytes::Bytes) -> Artifact {
        Artifact {
            id: Some(self.id),
            filename: self.filename,
            duration_secs: self.duration,
            mime: self.mime,
            size: self.size,
            created_at: self.ts,
            synced: self.synced,
            payload: ArtifactPayload::Blob(blob),
        }
    }
}

/// Write `value` as pretty JSON, replacing `path` atomically.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| StoreError::Serialization(format!("failed to serialize {}: {}", path.display(), e)))?;
    write_atomic(path, &json)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let json = fs::read(path)
        .map_err(|e| StoreError::Io(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_slice(&json)
        .map_err(|e| StoreError::Serialization(format!("failed to parse {}: {}", path.display(), e)))
}

/// Write through a temporary sibling and rename over the target.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)
        .map_err(|e| StoreError::Io(format!("failed to write {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| StoreError::Io(format!("failed to replace {}: {}", path.display(), e)))
}

/// Remove a file; a missing file is not an error.
pub fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::Io(format!("failed to remove {}: {}", path.display(), e))),
    }
}

/// SHA-256 hex digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex_encode(&Sha256::digest(data))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
