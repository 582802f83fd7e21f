use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::models::artifact::{Artifact, ArtifactId};
use crate::models::error::StoreError;
use crate::storage::metadata::{self, StoreManifest, StoredRecord, STORE_VERSION};
use crate::storage::views::ViewRegistry;
use crate::traits::store::{ArtifactStore, LoadedArtifact};

const MANIFEST_FILE: &str = "store.json";
const RECORDS_DIR: &str = "records";
const BLOBS_DIR: &str = "blobs";

/// Open store state. Created on first use and kept for the store's lifetime.
struct Connection {
    root: PathBuf,
    next_id: u64,
    records: BTreeMap<ArtifactId, StoredRecord>,
}

impl Connection {
    fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root.join(RECORDS_DIR))?;
        fs::create_dir_all(root.join(BLOBS_DIR))?;

        let manifest_path = root.join(MANIFEST_FILE);
        let manifest: StoreManifest = if manifest_path.exists() {
            metadata::read_json(&manifest_path)?
        } else {
            StoreManifest::default()
        };
        if manifest.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: manifest.version,
                expected: STORE_VERSION,
            });
        }

        let mut records = BTreeMap::new();
        for entry in fs::read_dir(root.join(RECORDS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match metadata::read_json::<StoredRecord>(&path) {
                Ok(record) => {
                    records.insert(record.id, record);
                }
                Err(e) => log::warn!("skipping unreadable record {}: {}", path.display(), e),
            }
        }

        let next_id = records
            .keys()
            .next_back()
            .map_or(1, |id| id.0 + 1)
            .max(manifest.next_id);

        log::info!("opened store at {} ({} records)", root.display(), records.len());

        Ok(Self {
            root: root.to_path_buf(),
            next_id,
            records,
        })
    }

    fn record_path(&self, id: ArtifactId) -> PathBuf {
        self.root.join(RECORDS_DIR).join(format!("{}.json", id.0))
    }

    fn blob_path(&self, id: ArtifactId) -> PathBuf {
        self.root.join(BLOBS_DIR).join(format!("{}.bin", id.0))
    }

    fn allocate_id(&mut self) -> Result<ArtifactId, StoreError> {
        let id = ArtifactId(self.next_id);
        self.next_id += 1;
        metadata::write_json(
            &StoreManifest {
                version: STORE_VERSION,
                next_id: self.next_id,
            },
            &self.root.join(MANIFEST_FILE),
        )?;
        Ok(id)
    }

    fn insert(&mut self, artifact: &Artifact) -> Result<ArtifactId, StoreError> {
        let blob = artifact
            .blob()
            .ok_or_else(|| StoreError::MissingPayload(artifact.filename.clone()))?;

        let id = self.allocate_id()?;
        let record = StoredRecord::new(id, artifact, metadata::sha256_hex(blob));

        let blob_path = self.blob_path(id);
        metadata::write_atomic(&blob_path, blob)?;
        if let Err(e) = metadata::write_json(&record, &self.record_path(id)) {
            if let Err(cleanup) = metadata::remove_if_exists(&blob_path) {
                log::warn!("failed to remove orphaned blob {}: {}", blob_path.display(), cleanup);
            }
            return Err(e);
        }
        self.records.insert(id, record);
        Ok(id)
    }

    fn remove(&mut self, id: ArtifactId) -> Result<bool, StoreError> {
        if self.records.remove(&id).is_none() {
            return Ok(false);
        }
        metadata::remove_if_exists(&self.record_path(id))?;
        metadata::remove_if_exists(&self.blob_path(id))?;
        Ok(true)
    }

    fn load(&self, record: &StoredRecord) -> Result<Bytes, StoreError> {
        let blob = fs::read(self.blob_path(record.id))
            .map_err(|e| StoreError::Corrupt {
                id: record.id,
                reason: format!("blob unreadable: {}", e),
            })?;
        let checksum = metadata::sha256_hex(&blob);
        if checksum != record.checksum {
            return Err(StoreError::Corrupt {
                id: record.id,
                reason: "checksum mismatch".into(),
            });
        }
        Ok(Bytes::from(blob))
    }
}

/// File-backed artifact store.
///
/// Layout under `root`:
/// ```text
/// store.json          ← { version, next_id }
/// records/<id>.json   ← metadata row with blob checksum
/// blobs/<id>.bin      ← encoded media
/// ```
/// Ids come from `next_id`, which only grows, so deleted ids are never
/// handed out again. All operations go through one lock.
pub struct LocalStore {
    root: PathBuf,
    views: Arc<ViewRegistry>,
    conn: Mutex<Option<Connection>>,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, views: Arc<ViewRegistry>) -> Self {
        Self {
            root: root.into(),
            views,
            conn: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn with_conn<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock();
        if guard.is_none() {
            *guard = Some(Connection::open(&self.root)?);
        }
        let conn = guard
            .as_mut()
            .ok_or_else(|| StoreError::Io("store connection unavailable".into()))?;
        op(conn)
    }
}

impl ArtifactStore for LocalStore {
    fn save(&self, artifact: &Artifact) -> Result<ArtifactId, StoreError> {
        let id = self.with_conn(|conn| conn.insert(artifact))?;
        log::debug!("saved {} as {}", artifact.filename, id);
        Ok(id)
    }

    /// Insert first, then drop older entries with the same filename, so a
    /// failed insert leaves the existing entry in place.
    fn put_unique(&self, artifact: &Artifact) -> Result<ArtifactId, StoreError> {
        self.with_conn(|conn| {
            let stale: Vec<ArtifactId> = conn
                .records
                .values()
                .filter(|r| r.filename == artifact.filename)
                .map(|r| r.id)
                .collect();
            let id = conn.insert(artifact)?;
            for old in stale {
                log::debug!("replacing {} ({} → {})", artifact.filename, old, id);
                conn.remove(old)?;
            }
            Ok(id)
        })
    }

    fn load_all(&self) -> Result<Vec<LoadedArtifact>, StoreError> {
        let artifacts = self.with_conn(|conn| {
            let mut records: Vec<&StoredRecord> = conn.records.values().collect();
            records.sort_by(|a, b| b.ts.cmp(&a.ts).then(b.id.cmp(&a.id)));

            let mut loaded = Vec::with_capacity(records.len());
            for record in records {
                match conn.load(record) {
                    Ok(blob) => loaded.push(record.clone().into_artifact(blob)),
                    Err(e) => log::warn!("skipping {}: {}", record.filename, e),
                }
            }
            Ok(loaded)
        })?;

        Ok(artifacts
            .into_iter()
            .map(|artifact| {
                let view = artifact.blob().map(|b| self.views.create(b.clone()));
                LoadedArtifact { artifact, view }
            })
            .collect())
    }

    fn delete(&self, id: ArtifactId) -> Result<(), StoreError> {
        if self.with_conn(|conn| conn.remove(id))? {
            log::debug!("deleted {}", id);
        }
        Ok(())
    }

    fn mark_synced(&self, id: ArtifactId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let path = conn.record_path(id);
            let Some(record) = conn.records.get_mut(&id) else {
                return Ok(());
            };
            if record.synced {
                return Ok(());
            }
            record.synced = true;
            metadata::write_json(record, &path)
        })
    }

    fn exists(&self, filename: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| Ok(conn.records.values().any(|r| r.filename == filename)))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let ids: Vec<ArtifactId> = conn.records.keys().copied().collect();
            for id in ids {
                conn.remove(id)?;
            }
            Ok(())
        })?;
        log::info!("store cleared");
        Ok(())
    }
}
