//! In-memory recordings list backed by an `ArtifactStore`.
//!
//! Holds every recording the user can see, newest first: artifacts loaded
//! from the store, recordings made this session (even when persisting them
//! failed), and entries recovered from the companion server.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::models::artifact::{Artifact, ArtifactId, ArtifactPayload, NativeFormat};
use crate::models::error::{LibraryError, StoreError, SyncError};
use crate::models::remote::{CompanionRecording, DownloadedBlob};
use crate::storage::views::{BlobView, ViewRegistry};
use crate::traits::remote::{CompanionServer, SessionProvider};
use crate::traits::store::ArtifactStore;

struct LibraryEntry {
    artifact: Artifact,
    view: Option<BlobView>,
    persisted: bool,
}

impl LibraryEntry {
    fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            artifact: self.artifact.clone(),
            view_url: self.view.as_ref().map(|v| v.url().to_string()),
            persisted: self.persisted,
        }
    }
}

#[derive(Default)]
struct LibraryState {
    entries: Vec<LibraryEntry>,
    preview: Option<String>,
}

impl LibraryState {
    fn position(&self, filename: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.artifact.filename == filename)
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.artifact.created_at.cmp(&a.artifact.created_at));
    }
}

/// Read-only view of one library entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot {
    pub artifact: Artifact,
    pub view_url: Option<String>,
    /// `false` when the store rejected this recording or it lives on the
    /// companion server.
    pub persisted: bool,
}

/// Result of adding a finished recording.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub id: Option<ArtifactId>,
    pub view_url: Option<String>,
    pub persist_error: Option<StoreError>,
}

/// Whether a sync run has anything to do, as far as the library can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAvailability {
    NoRecordings,
    AllSynced,
    Pending(usize),
}

impl SyncAvailability {
    pub fn label(&self) -> String {
        match self {
            Self::NoRecordings => "No recordings to sync".to_string(),
            Self::AllSynced => "All recordings already synced".to_string(),
            Self::Pending(1) => "Sync 1 recording".to_string(),
            Self::Pending(n) => format!("Sync {} recordings", n),
        }
    }

    pub fn can_sync(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// Companion server plus the session used to authenticate against it.
#[derive(Clone)]
pub struct CompanionLink {
    pub server: Arc<dyn CompanionServer>,
    pub session: Arc<dyn SessionProvider>,
}

impl CompanionLink {
    fn token(&self) -> Result<String, SyncError> {
        self.session.access_token().ok_or(SyncError::NotAuthenticated)
    }
}

/// A recording opened for playback. Dropping it releases any handle that
/// was created just for this playback.
#[derive(Debug)]
pub struct Playback {
    pub filename: String,
    pub mime: String,
    pub url: String,
    _owned: Option<BlobView>,
}

/// Bytes and name for saving a recording to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub filename: String,
    pub mime: &'static str,
    pub blob: Bytes,
}

pub struct Library {
    store: Arc<dyn ArtifactStore>,
    views: Arc<ViewRegistry>,
    companion: RwLock<Option<CompanionLink>>,
    state: RwLock<LibraryState>,
}

impl Library {
    pub fn new(store: Arc<dyn ArtifactStore>, views: Arc<ViewRegistry>) -> Self {
        Self {
            store,
            views,
            companion: RwLock::new(None),
            state: RwLock::new(LibraryState::default()),
        }
    }

    pub fn set_companion(&self, link: Option<CompanionLink>) {
        *self.companion.write() = link;
    }

    pub fn views(&self) -> &Arc<ViewRegistry> {
        &self.views
    }

    /// Load from the store, then merge the companion server's recordings
    /// if one is linked. Companion failures are logged, not returned.
    pub fn load(&self) -> Result<usize, StoreError> {
        self.reload()?;
        if self.companion.read().is_some() {
            match self.refresh_from_companion() {
                Ok(added) if added > 0 => log::info!("recovered {} recording(s) from companion", added),
                Ok(_) => {}
                Err(e) => log::warn!("companion server unavailable: {}", e),
            }
        }
        Ok(self.len())
    }

    /// Replace store-backed entries with the store's current content.
    ///
    /// Entries that never made it into the store (unsaved recordings and
    /// companion entries) are kept unless the store now has that filename.
    pub fn reload(&self) -> Result<usize, StoreError> {
        let loaded = self.store.load_all()?;

        let mut state = self.state.write();
        let kept: Vec<LibraryEntry> = std::mem::take(&mut state.entries)
            .into_iter()
            .filter(|e| !e.persisted)
            .filter(|e| !loaded.iter().any(|l| l.artifact.filename == e.artifact.filename))
            .collect();

        state.entries = loaded
            .into_iter()
            .map(|l| LibraryEntry {
                artifact: l.artifact,
                view: l.view,
                persisted: true,
            })
            .chain(kept)
            .collect();
        state.sort();

        log::debug!("library reloaded: {} entries", state.entries.len());
        Ok(state.entries.len())
    }

    /// Persist a finished recording and put it at the top of the list.
    ///
    /// A store failure is reported in the outcome; the recording stays
    /// available in memory.
    pub fn add(&self, mut artifact: Artifact) -> AddOutcome {
        let persist_error = match self.store.put_unique(&artifact) {
            Ok(id) => {
                artifact.id = Some(id);
                None
            }
            Err(e) => {
                log::error!("failed to persist {}: {}", artifact.filename, e);
                Some(e)
            }
        };

        let view = artifact.blob().map(|b| self.views.create(b.clone()));
        let outcome = AddOutcome {
            id: artifact.id,
            view_url: view.as_ref().map(|v| v.url().to_string()),
            persist_error,
        };

        let mut state = self.state.write();
        if let Some(pos) = state.position(&artifact.filename) {
            state.entries.remove(pos);
        }
        state.entries.insert(
            0,
            LibraryEntry {
                artifact,
                view,
                persisted: outcome.persist_error.is_none(),
            },
        );
        outcome
    }

    /// Remove a recording from the list and the store, releasing its
    /// playback handle. Returns `false` when no such entry exists.
    pub fn remove(&self, filename: &str) -> bool {
        let entry = {
            let mut state = self.state.write();
            let Some(pos) = state.position(filename) else {
                return false;
            };
            if state.preview.as_deref() == Some(filename) {
                state.preview = None;
            }
            state.entries.remove(pos)
        };

        if let Some(id) = entry.artifact.id {
            if let Err(e) = self.store.delete(id) {
                log::error!("failed to delete {} from store: {}", filename, e);
            }
        }
        log::info!("removed {}", filename);
        true
    }

    pub fn entries(&self) -> Vec<EntrySnapshot> {
        self.state.read().entries.iter().map(LibraryEntry::snapshot).collect()
    }

    pub fn get(&self, filename: &str) -> Option<EntrySnapshot> {
        let state = self.state.read();
        state.position(filename).map(|pos| state.entries[pos].snapshot())
    }

    /// Up to `n` newest entries.
    pub fn recent(&self, n: usize) -> Vec<EntrySnapshot> {
        self.state.read().entries.iter().take(n).map(LibraryEntry::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Put a recording in the single preview slot. Unknown names clear it.
    pub fn set_preview(&self, filename: Option<&str>) {
        let mut state = self.state.write();
        let known = filename.filter(|f| state.position(f).is_some()).map(str::to_string);
        state.preview = known;
    }

    pub fn preview(&self) -> Option<EntrySnapshot> {
        let state = self.state.read();
        let filename = state.preview.as_deref()?;
        state.position(filename).map(|pos| state.entries[pos].snapshot())
    }

    pub fn sync_availability(&self) -> SyncAvailability {
        let state = self.state.read();
        if state.entries.is_empty() {
            return SyncAvailability::NoRecordings;
        }
        match state.entries.iter().filter(|e| !e.artifact.synced).count() {
            0 => SyncAvailability::AllSynced,
            n => SyncAvailability::Pending(n),
        }
    }

    /// Get a playable handle for a recording, fetching companion entries
    /// from the server. The entry becomes the preview.
    pub fn open_for_playback(&self, filename: &str) -> Result<Playback, LibraryError> {
        let entry = self
            .get(filename)
            .ok_or_else(|| LibraryError::NotFound(filename.to_string()))?;

        let playback = match (&entry.artifact.payload, entry.view_url) {
            (ArtifactPayload::Blob(_), Some(url)) => Playback {
                filename: entry.artifact.filename.clone(),
                mime: entry.artifact.mime.clone(),
                url,
                _owned: None,
            },
            (ArtifactPayload::Blob(blob), None) => {
                let view = self.views.create(blob.clone());
                Playback {
                    filename: entry.artifact.filename.clone(),
                    mime: entry.artifact.mime.clone(),
                    url: view.url().to_string(),
                    _owned: Some(view),
                }
            }
            (ArtifactPayload::Companion { reference }, _) => {
                let fetched = self.fetch_companion(reference)?;
                let view = self.views.create(fetched.bytes);
                Playback {
                    filename: entry.artifact.filename.clone(),
                    mime: fetched
                        .content_type
                        .unwrap_or_else(|| entry.artifact.mime.clone()),
                    url: view.url().to_string(),
                    _owned: Some(view),
                }
            }
        };

        self.set_preview(Some(filename));
        Ok(playback)
    }

    /// Download name for a recording. Only the native format is offered;
    /// asking for the other one fails with `FormatMismatch`.
    pub fn export_name(
        &self,
        filename: &str,
        requested: Option<NativeFormat>,
    ) -> Result<String, LibraryError> {
        let entry = self
            .get(filename)
            .ok_or_else(|| LibraryError::NotFound(filename.to_string()))?;
        let native = entry.artifact.native_format();
        let format = requested.unwrap_or(native);
        if format != native {
            return Err(LibraryError::FormatMismatch {
                filename: filename.to_string(),
                native,
                requested: format,
            });
        }

        let base = filename.rsplit_once('.').map_or(filename, |(base, _)| base);
        Ok(format!("{}.{}", base, native.extension()))
    }

    /// Name, container type and bytes for saving a recording to disk.
    pub fn export(
        &self,
        filename: &str,
        requested: Option<NativeFormat>,
    ) -> Result<ExportTarget, LibraryError> {
        let name = self.export_name(filename, requested)?;
        let entry = self
            .get(filename)
            .ok_or_else(|| LibraryError::NotFound(filename.to_string()))?;

        let blob = match &entry.artifact.payload {
            ArtifactPayload::Blob(blob) => blob.clone(),
            ArtifactPayload::Companion { reference } => self.fetch_companion(reference)?.bytes,
        };

        Ok(ExportTarget {
            filename: name,
            mime: entry.artifact.native_format().container_mime(),
            blob,
        })
    }

    /// Add companion-server recordings whose filename is not in the list.
    /// Returns how many were added.
    pub fn merge_companion(&self, records: Vec<CompanionRecording>) -> usize {
        let mut state = self.state.write();
        let mut added = 0;
        for record in records {
            if state.position(&record.filename).is_some() {
                continue;
            }
            let mime = record.mime.clone().unwrap_or_else(|| {
                NativeFormat::from_filename(&record.filename)
                    .unwrap_or(NativeFormat::Webm)
                    .container_mime()
                    .to_string()
            });
            state.entries.push(LibraryEntry {
                artifact: Artifact {
                    id: None,
                    duration_secs: record.duration.max(0.0).round() as u64,
                    mime,
                    size: record.size,
                    created_at: record.ts,
                    synced: false,
                    payload: ArtifactPayload::Companion {
                        reference: record.filename.clone(),
                    },
                    filename: record.filename,
                },
                view: None,
                persisted: false,
            });
            added += 1;
        }
        if added > 0 {
            state.sort();
        }
        added
    }

    /// Fetch the companion server's list and merge it.
    pub fn refresh_from_companion(&self) -> Result<usize, LibraryError> {
        let link = self.companion_link()?;
        let records = link.server.list(&link.token()?)?;
        Ok(self.merge_companion(records))
    }

    /// Copy a locally held recording to the companion server.
    pub fn save_to_companion(&self, filename: &str) -> Result<(), LibraryError> {
        let link = self.companion_link()?;
        let entry = self
            .get(filename)
            .ok_or_else(|| LibraryError::NotFound(filename.to_string()))?;
        let blob = entry
            .artifact
            .blob()
            .cloned()
            .ok_or_else(|| LibraryError::NoLocalPayload(filename.to_string()))?;

        link.server.save(&link.token()?, &entry.artifact, blob)?;
        log::info!("saved {} to companion server", filename);
        Ok(())
    }

    fn companion_link(&self) -> Result<CompanionLink, LibraryError> {
        self.companion
            .read()
            .clone()
            .ok_or_else(|| LibraryError::Remote(SyncError::Protocol("companion server not configured".into())))
    }

    fn fetch_companion(
        &self,
        reference: &str,
    ) -> Result<DownloadedBlob, LibraryError> {
        let link = self.companion_link()?;
        Ok(link.server.fetch(&link.token()?, reference)?)
    }
}
