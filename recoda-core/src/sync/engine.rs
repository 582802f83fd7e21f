use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::artifact::{Artifact, NativeFormat};
use crate::models::error::{ItemFailure, StoreError, SyncError, TransferDirection};
use crate::models::remote::{NewRecording, RemoteRecording, RemoteUser, SyncPlan};
use crate::sync::manifest::build_manifest;
use crate::traits::remote::{RemoteCollaborator, SessionProvider, SignedTransfer};
use crate::traits::store::ArtifactStore;

/// What a failed item does to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// The first failed item ends the run with that item's error.
    #[default]
    AbortOnFirstFailure,
    /// Keep going; failed items are collected into `SyncError::Partial`.
    ContinueOnFailure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub policy: SyncPolicy,
}

/// Per-item outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub uploaded: Vec<String>,
    pub downloaded: Vec<String>,
    /// Items in the plan with nothing to move (no local blob, no download
    /// reference).
    pub skipped: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

impl SyncReport {
    pub fn transferred(&self) -> usize {
        self.uploaded.len() + self.downloaded.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconciles the local store with the remote collaborator.
///
/// Identity is the filename alone: whatever the remote lacks is uploaded,
/// whatever the store lacks is downloaded. Confirmed `synced` flips stay in
/// place when a run fails.
pub struct SyncEngine {
    store: Arc<dyn ArtifactStore>,
    remote: Arc<dyn RemoteCollaborator>,
    transfer: Arc<dyn SignedTransfer>,
    session: Arc<dyn SessionProvider>,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        remote: Arc<dyn RemoteCollaborator>,
        transfer: Arc<dyn SignedTransfer>,
        session: Arc<dyn SessionProvider>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            remote,
            transfer,
            session,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn token(&self) -> Result<String, SyncError> {
        self.session.access_token().ok_or(SyncError::NotAuthenticated)
    }

    pub fn signed_in_user(&self) -> Result<RemoteUser, SyncError> {
        self.remote.current_user(&self.token()?)
    }

    pub fn remote_recordings(&self) -> Result<Vec<RemoteRecording>, SyncError> {
        self.remote.list_recordings(&self.token()?)
    }

    /// Ask the remote for the diff without moving anything.
    pub fn plan(&self) -> Result<SyncPlan, SyncError> {
        let token = self.token()?;
        let local = self.store.load_all()?;
        self.remote.diff(&token, &build_manifest(&local))
    }

    /// Run one reconciliation pass.
    pub fn run(&self) -> Result<SyncReport, SyncError> {
        let token = self.token()?;
        let local = self.store.load_all()?;
        let plan = self.remote.diff(&token, &build_manifest(&local))?;
        log::info!(
            "sync plan: {} to upload, {} to download",
            plan.to_upload.len(),
            plan.to_download.len()
        );

        let mut report = SyncReport::default();

        for item in &plan.to_upload {
            let Some(loaded) = local.iter().find(|l| l.artifact.filename == item.filename) else {
                log::warn!("{} is not in the local store, skipping upload", item.filename);
                report.skipped.push(item.filename.clone());
                continue;
            };
            match self.upload(&token, &loaded.artifact) {
                Ok(()) => report.uploaded.push(item.filename.clone()),
                Err(e) => self.record_failure(&mut report, &item.filename, TransferDirection::Upload, e)?,
            }
        }

        for item in &plan.to_download {
            let Some(url) = item.download_url.as_deref() else {
                log::warn!("{} has no download reference, skipping", item.filename);
                report.skipped.push(item.filename.clone());
                continue;
            };
            match self.download(item, url) {
                Ok(()) => report.downloaded.push(item.filename.clone()),
                Err(e) => {
                    self.record_failure(&mut report, &item.filename, TransferDirection::Download, e)?
                }
            }
        }

        log::info!(
            "sync finished: {} uploaded, {} downloaded, {} skipped, {} failed",
            report.uploaded.len(),
            report.downloaded.len(),
            report.skipped.len(),
            report.failures.len()
        );

        if report.is_clean() {
            Ok(report)
        } else {
            Err(SyncError::Partial(Box::new(report)))
        }
    }

    /// Abort with `error`, or note it and carry on, depending on policy.
    /// Authentication failures always abort.
    fn record_failure(
        &self,
        report: &mut SyncReport,
        filename: &str,
        direction: TransferDirection,
        error: SyncError,
    ) -> Result<(), SyncError> {
        log::error!("{:?} of {} failed: {}", direction, filename, error);
        let auth = matches!(error, SyncError::NotAuthenticated | SyncError::AuthExpired);
        if auth || self.config.policy == SyncPolicy::AbortOnFirstFailure {
            return Err(error);
        }
        report.failures.push(ItemFailure {
            filename: filename.to_string(),
            direction,
            reason: error.to_string(),
        });
        Ok(())
    }

    fn upload(&self, token: &str, artifact: &Artifact) -> Result<(), SyncError> {
        let blob = artifact
            .blob()
            .cloned()
            .ok_or_else(|| StoreError::MissingPayload(artifact.filename.clone()))?;

        let signed = self.remote.sign_upload(token, &artifact.filename)?;
        log::debug!("uploading {} to {}", artifact.filename, signed.path);
        self.transfer.upload(&signed, blob, &artifact.mime)?;
        self.remote.register_recording(token, &NewRecording::from(artifact))?;

        if let Some(id) = artifact.id {
            self.store.mark_synced(id)?;
        }
        log::info!("uploaded {}", artifact.filename);
        Ok(())
    }

    fn download(&self, item: &RemoteRecording, url: &str) -> Result<(), SyncError> {
        let fetched = self.transfer.download(url)?;

        let mime = item
            .mime_type
            .clone()
            .filter(|m| !m.is_empty())
            .or(fetched.content_type.filter(|m| !m.is_empty()))
            .unwrap_or_else(|| {
                NativeFormat::from_filename(&item.filename)
                    .unwrap_or(NativeFormat::Webm)
                    .container_mime()
                    .to_string()
            });
        let duration = item.duration.map_or(0, |d| d.max(0.0).round() as u64);

        let artifact = Artifact::from_blob(
            fetched.bytes,
            item.filename.clone(),
            duration,
            mime,
            item.created_at,
        )
        .with_synced(true);
        self.store.put_unique(&artifact)?;

        log::info!("downloaded {}", item.filename);
        Ok(())
    }
}
