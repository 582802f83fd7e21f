//! In-memory fakes for platform devices, the encoder, the audio graph and
//! the remote collaborator.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::models::artifact::{Artifact, ArtifactId};
use crate::models::audio_models::{AudioLevels, TrackKind};
use crate::models::config::{CameraConstraints, DisplayConstraints};
use crate::models::error::{CaptureError, StoreError, SyncError};
use crate::models::events::{Notice, Preview};
use crate::models::recording_result::RecordingOutcome;
use crate::models::remote::{
    CompanionRecording, DownloadedBlob, ManifestEntry, NewRecording, RemoteRecording, RemoteUser,
    SignedUpload, SyncPlan, UploadItem,
};
use crate::models::state::CaptureState;
use crate::processing::levels::AnalyserOptions;
use crate::traits::audio_graph::{AudioBackend, AudioGraph, LevelTap};
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::encoder::{ChunkCallback, Encoder, EncoderFactory, EncoderOptions, EncoderState};
use crate::traits::media::{EndedCallback, MediaStream, MediaTrack};
use crate::traits::remote::{CompanionServer, RemoteCollaborator, SignedTransfer};
use crate::traits::store::{ArtifactStore, LoadedArtifact};

// --- Media ---

pub struct FakeTrack {
    id: String,
    kind: TrackKind,
    live: AtomicBool,
    stops: AtomicUsize,
    listeners: Mutex<Vec<EndedCallback>>,
}

impl FakeTrack {
    pub fn new(id: &str, kind: TrackKind) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            kind,
            live: AtomicBool::new(true),
            stops: AtomicUsize::new(0),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn audio(id: &str) -> Arc<dyn MediaTrack> {
        Self::new(id, TrackKind::Audio)
    }

    pub fn video(id: &str) -> Arc<dyn MediaTrack> {
        Self::new(id, TrackKind::Video)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Simulate the platform ending the track (e.g. sharing revoked).
    pub fn end(&self) {
        self.live.store(false, Ordering::SeqCst);
        let listeners: Vec<EndedCallback> = self.listeners.lock().clone();
        for listener in listeners {
            listener();
        }
    }
}

impl MediaTrack for FakeTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn on_ended(&self, callback: EndedCallback) {
        self.listeners.lock().push(callback);
    }
}

fn stream_of(tracks: &[Arc<FakeTrack>]) -> MediaStream {
    MediaStream::new(tracks.iter().map(|t| Arc::clone(t) as Arc<dyn MediaTrack>).collect())
}

#[derive(Default)]
pub struct FakeProvider {
    pub display_error: Mutex<Option<CaptureError>>,
    pub mic_error: Mutex<Option<CaptureError>>,
    pub camera_error: Mutex<Option<CaptureError>>,
    pub system_audio_available: AtomicBool,
    display_calls: AtomicUsize,
    mic_calls: AtomicUsize,
    camera_calls: AtomicUsize,
    last_constraints: Mutex<Option<DisplayConstraints>>,
    display_video: Mutex<Option<Arc<FakeTrack>>>,
    camera_tracks: Mutex<Vec<Arc<FakeTrack>>>,
    acquired: Mutex<Vec<Arc<FakeTrack>>>,
}

impl FakeProvider {
    pub fn with_system_audio() -> Self {
        let provider = Self::default();
        provider.system_audio_available.store(true, Ordering::SeqCst);
        provider
    }

    pub fn deny_display(&self, error: CaptureError) {
        *self.display_error.lock() = Some(error);
    }

    pub fn deny_microphone(&self) {
        *self.mic_error.lock() = Some(CaptureError::PermissionDenied);
    }

    pub fn deny_camera(&self) {
        *self.camera_error.lock() = Some(CaptureError::DeviceUnavailable("no camera".into()));
    }

    pub fn display_calls(&self) -> usize {
        self.display_calls.load(Ordering::SeqCst)
    }

    pub fn mic_calls(&self) -> usize {
        self.mic_calls.load(Ordering::SeqCst)
    }

    pub fn camera_calls(&self) -> usize {
        self.camera_calls.load(Ordering::SeqCst)
    }

    pub fn last_constraints(&self) -> Option<DisplayConstraints> {
        *self.last_constraints.lock()
    }

    /// Every track handed out so far.
    pub fn acquired(&self) -> Vec<Arc<FakeTrack>> {
        self.acquired.lock().clone()
    }

    pub fn camera_tracks(&self) -> Vec<Arc<FakeTrack>> {
        self.camera_tracks.lock().clone()
    }

    pub fn end_display(&self) {
        let track = self.display_video.lock().clone();
        if let Some(track) = track {
            track.end();
        }
    }

    fn hand_out(&self, tracks: Vec<Arc<FakeTrack>>) -> MediaStream {
        self.acquired.lock().extend(tracks.iter().cloned());
        stream_of(&tracks)
    }
}

impl CaptureProvider for FakeProvider {
    fn get_display_media(
        &self,
        constraints: &DisplayConstraints,
        system_audio: bool,
    ) -> Result<MediaStream, CaptureError> {
        self.display_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_constraints.lock() = Some(*constraints);
        if let Some(e) = self.display_error.lock().clone() {
            return Err(e);
        }

        let video = FakeTrack::new("screen", TrackKind::Video);
        *self.display_video.lock() = Some(Arc::clone(&video));
        let mut tracks = vec![video];
        if system_audio && self.system_audio_available.load(Ordering::SeqCst) {
            tracks.push(FakeTrack::new("system", TrackKind::Audio));
        }
        Ok(self.hand_out(tracks))
    }

    fn get_microphone(&self) -> Result<MediaStream, CaptureError> {
        self.mic_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.mic_error.lock().clone() {
            return Err(e);
        }
        Ok(self.hand_out(vec![FakeTrack::new("mic", TrackKind::Audio)]))
    }

    fn get_camera(&self, _constraints: &CameraConstraints) -> Result<MediaStream, CaptureError> {
        self.camera_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.camera_error.lock().clone() {
            return Err(e);
        }
        let track = FakeTrack::new("camera", TrackKind::Video);
        self.camera_tracks.lock().push(Arc::clone(&track));
        Ok(self.hand_out(vec![track]))
    }
}

// --- Audio graph ---

pub struct FakeTap {
    level: u8,
}

impl FakeTap {
    pub fn constant(level: u8) -> Self {
        Self { level }
    }
}

impl LevelTap for FakeTap {
    fn frequency_data(&self) -> Vec<u8> {
        vec![self.level; 128]
    }
}

struct FakeGraph {
    closed: Arc<AtomicUsize>,
    mixes: Arc<AtomicUsize>,
}

impl AudioGraph for FakeGraph {
    fn mix(&self, inputs: &[&MediaStream]) -> Result<Vec<Arc<dyn MediaTrack>>, CaptureError> {
        self.mixes.fetch_add(1, Ordering::SeqCst);
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![FakeTrack::audio("mixed")])
    }

    fn analyser(
        &self,
        _stream: &MediaStream,
        _options: AnalyserOptions,
    ) -> Result<Arc<dyn LevelTap>, CaptureError> {
        Ok(Arc::new(FakeTap::constant(128)))
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeAudioBackend {
    created: AtomicUsize,
    closed: Arc<AtomicUsize>,
    mixes: Arc<AtomicUsize>,
}

impl FakeAudioBackend {
    pub fn graphs_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn graphs_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn mixes(&self) -> usize {
        self.mixes.load(Ordering::SeqCst)
    }
}

impl AudioBackend for FakeAudioBackend {
    fn create_graph(&self) -> Result<Arc<dyn AudioGraph>, CaptureError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeGraph {
            closed: Arc::clone(&self.closed),
            mixes: Arc::clone(&self.mixes),
        }))
    }
}

// --- Encoder ---

struct FakeEncoder {
    mime: String,
    state: EncoderState,
    on_chunk: ChunkCallback,
    calls: Arc<Mutex<Vec<&'static str>>>,
    fail_start: bool,
}

impl Encoder for FakeEncoder {
    fn mime_type(&self) -> String {
        self.mime.clone()
    }

    fn state(&self) -> EncoderState {
        self.state
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        self.calls.lock().push("start");
        if self.fail_start {
            return Err(CaptureError::EncodingFailed("encoder refused to start".into()));
        }
        self.state = EncoderState::Recording;
        (self.on_chunk)(Bytes::from_static(b"head"));
        Ok(())
    }

    fn pause(&mut self) -> Result<(), CaptureError> {
        self.calls.lock().push("pause");
        self.state = EncoderState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        self.calls.lock().push("resume");
        self.state = EncoderState::Recording;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.calls.lock().push("stop");
        self.state = EncoderState::Inactive;
        (self.on_chunk)(Bytes::new());
        (self.on_chunk)(Bytes::from_static(b"tail"));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeEncoderFactory {
    supported: Vec<&'static str>,
    pub fail_start: AtomicBool,
    created: AtomicUsize,
    calls: Arc<Mutex<Vec<&'static str>>>,
    last_options: Mutex<Option<EncoderOptions>>,
    last_track_count: AtomicUsize,
}

impl FakeEncoderFactory {
    pub fn supporting(mimes: &[&'static str]) -> Self {
        Self {
            supported: mimes.to_vec(),
            ..Default::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn last_options(&self) -> Option<EncoderOptions> {
        self.last_options.lock().clone()
    }

    /// Tracks in the stream handed to the last encoder.
    pub fn last_track_count(&self) -> usize {
        self.last_track_count.load(Ordering::SeqCst)
    }
}

impl EncoderFactory for FakeEncoderFactory {
    fn is_type_supported(&self, mime: &str) -> bool {
        self.supported.contains(&mime)
    }

    fn create(
        &self,
        stream: &MediaStream,
        options: &EncoderOptions,
        on_chunk: ChunkCallback,
    ) -> Result<Box<dyn Encoder>, CaptureError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock() = Some(options.clone());
        self.last_track_count.store(stream.tracks().len(), Ordering::SeqCst);
        Ok(Box::new(FakeEncoder {
            mime: options.mime_type.clone(),
            state: EncoderState::Inactive,
            on_chunk,
            calls: Arc::clone(&self.calls),
            fail_start: self.fail_start.load(Ordering::SeqCst),
        }))
    }
}

// --- Store ---

/// A store whose writes always fail.
pub struct FailingStore;

impl FailingStore {
    fn error() -> StoreError {
        StoreError::Io("disk full".into())
    }
}

impl ArtifactStore for FailingStore {
    fn save(&self, _artifact: &Artifact) -> Result<ArtifactId, StoreError> {
        Err(Self::error())
    }

    fn put_unique(&self, _artifact: &Artifact) -> Result<ArtifactId, StoreError> {
        Err(Self::error())
    }

    fn load_all(&self) -> Result<Vec<LoadedArtifact>, StoreError> {
        Ok(Vec::new())
    }

    fn delete(&self, _id: ArtifactId) -> Result<(), StoreError> {
        Err(Self::error())
    }

    fn mark_synced(&self, _id: ArtifactId) -> Result<(), StoreError> {
        Err(Self::error())
    }

    fn exists(&self, _filename: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn clear(&self) -> Result<(), StoreError> {
        Err(Self::error())
    }
}

// --- Remote ---

#[derive(Default)]
struct RemoteState {
    recordings: Vec<RemoteRecording>,
    /// filename → (bytes, content type)
    objects: HashMap<String, (Bytes, String)>,
    created_at: HashMap<String, DateTime<Utc>>,
    last_manifest: Vec<ManifestEntry>,
    fail_upload: HashSet<String>,
    expire_sign: bool,
}

/// Remote metadata table and object store kept in memory.
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<RemoteState>,
    diff_calls: AtomicUsize,
    transfers: AtomicUsize,
}

const OBJECT_PREFIX: &str = "fake://objects/";

impl FakeRemote {
    pub fn recordings(&self) -> Vec<RemoteRecording> {
        self.state.lock().recordings.clone()
    }

    pub fn uploaded_content_type(&self, filename: &str) -> Option<String> {
        self.state.lock().objects.get(filename).map(|(_, ct)| ct.clone())
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.load(Ordering::SeqCst)
    }

    pub fn diff_calls(&self) -> usize {
        self.diff_calls.load(Ordering::SeqCst)
    }

    pub fn last_manifest(&self) -> Vec<ManifestEntry> {
        self.state.lock().last_manifest.clone()
    }

    pub fn fail_upload_of(&self, filename: &str) {
        self.state.lock().fail_upload.insert(filename.to_string());
    }

    pub fn expire_sign(&self) {
        self.state.lock().expire_sign = true;
    }

    /// A recording that exists only remotely, optionally with stored bytes
    /// `(content type, body)`. No metadata besides the name is recorded.
    pub fn add_remote_only(&self, filename: &str, object: Option<(&str, &[u8])>) {
        let mut state = self.state.lock();
        state.recordings.push(RemoteRecording {
            filename: filename.to_string(),
            duration: None,
            size: None,
            mime_type: None,
            created_at: Utc::now(),
            download_url: None,
        });
        if let Some((content_type, body)) = object {
            state
                .objects
                .insert(filename.to_string(), (Bytes::copy_from_slice(body), content_type.to_string()));
        }
    }
}

impl RemoteCollaborator for FakeRemote {
    fn current_user(&self, _token: &str) -> Result<RemoteUser, SyncError> {
        Ok(RemoteUser {
            id: "user-1".into(),
            email: None,
        })
    }

    fn list_recordings(&self, _token: &str) -> Result<Vec<RemoteRecording>, SyncError> {
        Ok(self.recordings())
    }

    fn register_recording(
        &self,
        _token: &str,
        recording: &NewRecording,
    ) -> Result<RemoteRecording, SyncError> {
        let mut state = self.state.lock();
        let created_at = state
            .created_at
            .get(&recording.filename)
            .copied()
            .unwrap_or_else(Utc::now);
        let stored = RemoteRecording {
            filename: recording.filename.clone(),
            duration: Some(recording.duration as f64),
            size: Some(recording.size),
            mime_type: Some(recording.mime_type.clone()),
            created_at,
            download_url: None,
        };
        state.recordings.push(stored.clone());
        Ok(stored)
    }

    fn diff(&self, _token: &str, manifest: &[ManifestEntry]) -> Result<SyncPlan, SyncError> {
        self.diff_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        state.last_manifest = manifest.to_vec();
        for entry in manifest {
            state.created_at.insert(entry.filename.clone(), entry.created_at);
        }

        let to_upload = manifest
            .iter()
            .filter(|m| !state.recordings.iter().any(|r| r.filename == m.filename))
            .map(|m| UploadItem {
                filename: m.filename.clone(),
                created_at: Some(m.created_at),
            })
            .collect();
        let to_download = state
            .recordings
            .iter()
            .filter(|r| !manifest.iter().any(|m| m.filename == r.filename))
            .map(|r| RemoteRecording {
                download_url: state
                    .objects
                    .contains_key(&r.filename)
                    .then(|| format!("{}{}", OBJECT_PREFIX, r.filename)),
                ..r.clone()
            })
            .collect();

        Ok(SyncPlan {
            to_upload,
            to_download,
        })
    }

    fn sign_upload(&self, _token: &str, filename: &str) -> Result<SignedUpload, SyncError> {
        let state = self.state.lock();
        if state.expire_sign {
            return Err(SyncError::AuthExpired);
        }
        if state.fail_upload.contains(filename) {
            return Err(SyncError::Server {
                status: 500,
                message: "storage unavailable".into(),
            });
        }
        Ok(SignedUpload {
            signed_url: format!("fake://upload/{}", filename),
            path: format!("user-1/{}", filename),
            token: None,
        })
    }
}

impl SignedTransfer for FakeRemote {
    fn upload(&self, target: &SignedUpload, body: Bytes, content_type: &str) -> Result<(), SyncError> {
        self.transfers.fetch_add(1, Ordering::SeqCst);
        let filename = target
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&target.path)
            .to_string();
        self.state
            .lock()
            .objects
            .insert(filename, (body, content_type.to_string()));
        Ok(())
    }

    fn download(&self, url: &str) -> Result<DownloadedBlob, SyncError> {
        self.transfers.fetch_add(1, Ordering::SeqCst);
        let filename = url.strip_prefix(OBJECT_PREFIX).unwrap_or(url);
        let state = self.state.lock();
        let (bytes, content_type) = state.objects.get(filename).ok_or_else(|| SyncError::Transfer {
            filename: filename.to_string(),
            reason: "object not found".into(),
        })?;
        Ok(DownloadedBlob {
            bytes: bytes.clone(),
            content_type: Some(content_type.clone()),
        })
    }
}

#[derive(Default)]
pub struct FakeCompanion {
    files: Mutex<Vec<(CompanionRecording, Bytes)>>,
    saved: Mutex<Vec<String>>,
}

impl FakeCompanion {
    pub fn with_file(filename: &str, body: &'static [u8]) -> Self {
        let companion = Self::default();
        companion.files.lock().push((
            CompanionRecording {
                filename: filename.to_string(),
                duration: 3.0,
                mime: None,
                ts: Utc::now(),
                size: body.len() as u64,
            },
            Bytes::from_static(body),
        ));
        companion
    }

    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().clone()
    }
}

impl CompanionServer for FakeCompanion {
    fn list(&self, _token: &str) -> Result<Vec<CompanionRecording>, SyncError> {
        Ok(self.files.lock().iter().map(|(r, _)| r.clone()).collect())
    }

    fn fetch(&self, _token: &str, filename: &str) -> Result<DownloadedBlob, SyncError> {
        self.files
            .lock()
            .iter()
            .find(|(r, _)| r.filename == filename)
            .map(|(_, body)| DownloadedBlob {
                bytes: body.clone(),
                content_type: None,
            })
            .ok_or_else(|| SyncError::Server {
                status: 404,
                message: "File not found".into(),
            })
    }

    fn save(&self, _token: &str, artifact: &Artifact, _body: Bytes) -> Result<(), SyncError> {
        self.saved.lock().push(artifact.filename.clone());
        Ok(())
    }
}

// --- Delegate ---

#[derive(Debug, Clone)]
pub enum Event {
    State(CaptureState, CaptureState),
    Countdown(u8),
    Elapsed(u64),
    Levels(AudioLevels),
    Preview(String),
    Notice(Notice),
    Error(CaptureError),
    Finished(Box<RecordingOutcome>),
}

type CountdownHook = Box<dyn Fn(u8) + Send + Sync>;
type PreviewHook = Box<dyn Fn(&str) + Send + Sync>;

/// Delegate that records every event it receives.
#[derive(Default)]
pub struct RecordingDelegate {
    events: Mutex<Vec<Event>>,
    countdown_hook: Mutex<Option<CountdownHook>>,
    preview_hook: Mutex<Option<PreviewHook>>,
}

impl RecordingDelegate {
    /// Run `hook` from inside `on_countdown`, on the thread driving `start`.
    pub fn with_countdown_hook(hook: impl Fn(u8) + Send + Sync + 'static) -> Self {
        let delegate = Self::default();
        *delegate.countdown_hook.lock() = Some(Box::new(hook));
        delegate
    }

    /// Run `hook` with the preview label from inside `on_preview`.
    pub fn with_preview_hook(hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        let delegate = Self::default();
        *delegate.preview_hook.lock() = Some(Box::new(hook));
        delegate
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn states(&self) -> Vec<CaptureState> {
        self.collect(|e| match e {
            Event::State(s, _) => Some(*s),
            _ => None,
        })
    }

    pub fn countdowns(&self) -> Vec<u8> {
        self.collect(|e| match e {
            Event::Countdown(n) => Some(*n),
            _ => None,
        })
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.collect(|e| match e {
            Event::Notice(n) => Some(n.clone()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<CaptureError> {
        self.collect(|e| match e {
            Event::Error(err) => Some(err.clone()),
            _ => None,
        })
    }

    pub fn finished(&self) -> Vec<RecordingOutcome> {
        self.collect(|e| match e {
            Event::Finished(o) => Some((**o).clone()),
            _ => None,
        })
    }

    pub fn previews(&self) -> Vec<String> {
        self.collect(|e| match e {
            Event::Preview(p) => Some(p.clone()),
            _ => None,
        })
    }

    pub fn levels(&self) -> Vec<AudioLevels> {
        self.collect(|e| match e {
            Event::Levels(l) => Some(*l),
            _ => None,
        })
    }

    fn collect<T>(&self, pick: impl Fn(&Event) -> Option<T>) -> Vec<T> {
        self.events.lock().iter().filter_map(pick).collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl CaptureDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: CaptureState, previous: CaptureState) {
        self.push(Event::State(state, previous));
    }

    fn on_countdown(&self, remaining: u8) {
        self.push(Event::Countdown(remaining));
        if let Some(hook) = self.countdown_hook.lock().as_ref() {
            hook(remaining);
        }
    }

    fn on_elapsed(&self, elapsed_secs: u64) {
        self.push(Event::Elapsed(elapsed_secs));
    }

    fn on_levels_updated(&self, levels: &AudioLevels) {
        self.push(Event::Levels(*levels));
    }

    fn on_preview(&self, preview: &Preview) {
        let label = match preview {
            Preview::LiveDisplay(_) => "display".to_string(),
            Preview::Webcam(Some(_)) => "webcam".to_string(),
            Preview::Webcam(None) => "webcam-closed".to_string(),
            Preview::Recording { filename, .. } => format!("recording:{}", filename),
        };
        if let Some(hook) = self.preview_hook.lock().as_ref() {
            hook(&label);
        }
        self.push(Event::Preview(label));
    }

    fn on_notice(&self, notice: &Notice) {
        self.push(Event::Notice(notice.clone()));
    }

    fn on_error(&self, error: &CaptureError) {
        self.push(Event::Error(error.clone()));
    }

    fn on_capture_finished(&self, outcome: &RecordingOutcome) {
        self.push(Event::Finished(Box::new(outcome.clone())));
    }
}
