use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use chrono::{Local, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::library::Library;
use crate::models::artifact::{format_elapsed, format_size, recording_filename, Artifact};
use crate::models::config::{AudioSourceMode, CameraConstraints, CaptureConfiguration};
use crate::models::error::CaptureError;
use crate::models::events::{Notice, Preview};
use crate::models::recording_result::RecordingOutcome;
use crate::models::state::CaptureState;
use crate::processing::audio_mixer::AudioMixer;
use crate::processing::format::negotiate_mime;
use crate::session::countdown::{run_countdown, CancelReason, CancelToken};
use crate::session::events::{DelegateHub, Subscription};
use crate::session::live::LiveSession;
use crate::session::meter::LevelMeter;
use crate::session::ticker::Ticker;
use crate::traits::audio_graph::AudioBackend;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::encoder::{EncoderFactory, EncoderOptions};
use crate::traits::media::MediaStream;

struct Status {
    state: CaptureState,
    elapsed_secs: u64,
}

struct SessionInner {
    provider: Arc<dyn CaptureProvider>,
    encoders: Arc<dyn EncoderFactory>,
    audio: AudioMixer,
    library: Arc<Library>,
    config: Mutex<CaptureConfiguration>,
    status: Mutex<Status>,
    live: Mutex<Option<LiveSession>>,
    /// Cancellation for the start attempt in flight, if any.
    pending: Mutex<Option<CancelToken>>,
    starting: AtomicBool,
    delegates: DelegateHub,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(token) = self.pending.get_mut().take() {
            token.cancel(CancelReason::Abort);
        }
        if let Some(live) = self.live.get_mut().take() {
            log::warn!("[{}] session dropped while capturing, releasing sources", live.id);
            live.release(&self.audio);
        }
    }
}

struct StartingGuard<'a>(&'a AtomicBool);

impl Drop for StartingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Screen capture state machine.
///
/// Owns every source, the audio graph and the encoder for the lifetime of
/// one recording, and hands the finished artifact to the [`Library`].
///
/// ```text
/// [Display] ─────────────────── video ──┐
/// [Display audio] ─┐                    ├→ [Encoder] → chunks → Artifact → Library
/// [Microphone] ────┴→ [AudioMixer] ─────┘
///                          └→ [LevelMeter] → on_levels_updated
/// ```
///
/// Cheap to clone; clones drive the same session. Start blocks the caller
/// for the countdown. Stop, pause and abort may be called from any thread.
#[derive(Clone)]
pub struct CaptureSession {
    inner: Arc<SessionInner>,
}

impl CaptureSession {
    pub fn new(
        provider: Arc<dyn CaptureProvider>,
        encoders: Arc<dyn EncoderFactory>,
        audio_backend: Arc<dyn AudioBackend>,
        library: Arc<Library>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                provider,
                encoders,
                audio: AudioMixer::new(audio_backend),
                library,
                config: Mutex::new(CaptureConfiguration::default()),
                status: Mutex::new(Status {
                    state: CaptureState::Idle,
                    elapsed_secs: 0,
                }),
                live: Mutex::new(None),
                pending: Mutex::new(None),
                starting: AtomicBool::new(false),
                delegates: DelegateHub::default(),
            }),
        }
    }

    pub fn subscribe(&self, delegate: Arc<dyn CaptureDelegate>) -> Subscription {
        self.inner.delegates.subscribe(delegate)
    }

    pub fn state(&self) -> CaptureState {
        self.inner.status.lock().state
    }

    /// Whole seconds spent in `Recording`. Paused time is not counted.
    pub fn elapsed_secs(&self) -> u64 {
        self.inner.status.lock().elapsed_secs
    }

    /// A start attempt is acquiring sources or counting down.
    pub fn is_starting(&self) -> bool {
        self.inner.starting.load(Ordering::SeqCst)
    }

    pub fn configuration(&self) -> CaptureConfiguration {
        self.inner.config.lock().clone()
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.inner.library
    }

    /// Replace the configuration. Only allowed while idle.
    pub fn configure(&self, config: CaptureConfiguration) -> Result<(), CaptureError> {
        if !self.state().is_idle() || self.is_starting() {
            return Err(CaptureError::ConfigurationFailed(
                "can only configure while idle".into(),
            ));
        }
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        log::debug!(
            "configured: quality {:?}, audio {:?}, format {:?}",
            config.quality,
            config.audio_source,
            config.format
        );
        *self.inner.config.lock() = config;
        Ok(())
    }

    /// Toggle the webcam overlay. Takes effect immediately while recording.
    pub fn set_webcam_enabled(&self, enabled: bool) {
        self.inner.config.lock().webcam_enabled = enabled;

        let mut guard = self.inner.live.lock();
        let Some(live) = guard.as_mut() else {
            return;
        };
        if enabled {
            let result = self.open_camera(live);
            drop(guard);
            self.announce_camera(result);
        } else if live.close_camera() {
            drop(guard);
            self.inner
                .delegates
                .emit(|d| d.on_preview(&Preview::Webcam(None)));
        }
    }

    /// Acquire sources, count down and begin encoding.
    ///
    /// Blocks for the countdown. Any failure releases whatever had been
    /// acquired, leaves the session idle and is also reported through
    /// `on_error`. Calling this while not idle is rejected with no side
    /// effects.
    pub fn start(&self) -> Result<(), CaptureError> {
        if self.inner.starting.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::InvalidTransition(
                "start already in progress".into(),
            ));
        }
        let _starting = StartingGuard(&self.inner.starting);

        let state = self.state();
        if !state.is_idle() {
            return Err(CaptureError::InvalidTransition(format!(
                "cannot start while {:?}",
                state
            )));
        }

        let config = self.configuration();
        let token = CancelToken::default();
        *self.inner.pending.lock() = Some(token.clone());

        let id = Uuid::new_v4();
        log::info!(
            "[{}] starting capture: quality {:?}, audio {:?}, format {:?}, webcam {}",
            id,
            config.quality,
            config.audio_source,
            config.format,
            config.webcam_enabled
        );

        let live = match self.acquire(id, &config, &token) {
            Ok(live) => live,
            Err(e) => {
                *self.inner.pending.lock() = None;
                if let Some(reason @ (CancelReason::Stop | CancelReason::Abort)) = token.reason() {
                    log::info!("[{}] start cancelled by user ({:?})", id, reason);
                    return Err(e);
                }
                if e.is_permission_style() {
                    log::warn!("[{}] capture not started: {}", id, e);
                } else {
                    log::error!("[{}] capture failed to start: {}", id, e);
                }
                self.inner.delegates.emit(|d| d.on_error(&e));
                return Err(e);
            }
        };

        {
            let mut slot = self.inner.live.lock();
            let mut status = self.inner.status.lock();
            status.state = CaptureState::Recording;
            status.elapsed_secs = 0;
            *slot = Some(live);
        }
        *self.inner.pending.lock() = None;

        log::info!("[{}] recording", id);
        self.inner
            .delegates
            .emit(|d| d.on_state_changed(CaptureState::Recording, CaptureState::Idle));
        self.inner
            .delegates
            .emit(|d| d.on_notice(&Notice::RecordingStarted));

        // Stop, abort or a display end may have arrived between countdown
        // and going live.
        match token.reason() {
            Some(CancelReason::Abort) => {
                log::info!("[{}] aborted while going live", id);
                self.abort();
            }
            Some(reason) => {
                log::info!("[{}] stopped while going live ({:?})", id, reason);
                self.stop();
            }
            None => {}
        }
        Ok(())
    }

    /// Recording ↔ Paused. Returns the new state.
    pub fn toggle_pause(&self) -> Result<CaptureState, CaptureError> {
        let (next, previous) = {
            let mut guard = self.inner.live.lock();
            let live = guard
                .as_mut()
                .ok_or_else(|| CaptureError::InvalidTransition("nothing to pause".into()))?;

            let previous = self.inner.status.lock().state;
            let next = match previous {
                CaptureState::Recording => CaptureState::Paused,
                CaptureState::Paused => CaptureState::Recording,
                CaptureState::Idle => {
                    return Err(CaptureError::InvalidTransition("nothing to pause".into()))
                }
            };

            if let Some(encoder) = live.encoder.as_mut() {
                match next {
                    CaptureState::Paused => encoder.pause()?,
                    _ => encoder.resume()?,
                }
            }
            self.inner.status.lock().state = next;
            log::info!("[{}] {:?} → {:?}", live.id, previous, next);
            (next, previous)
        };

        self.inner
            .delegates
            .emit(|d| d.on_state_changed(next, previous));
        Ok(next)
    }

    /// Finish the recording and hand it to the library.
    ///
    /// Also cancels a start attempt that is still counting down. Returns
    /// `None` when nothing was being recorded.
    pub fn stop(&self) -> Option<RecordingOutcome> {
        if let Some(token) = self.inner.pending.lock().as_ref() {
            token.cancel(CancelReason::Stop);
        }
        let live = self.inner.live.lock().take()?;
        Some(self.finish(live))
    }

    /// Abandon the current attempt: cancels a pending start, or ends a live
    /// recording without keeping it. Returns `false` when there was nothing
    /// to abort.
    pub fn abort(&self) -> bool {
        let cancelled = match self.inner.pending.lock().as_ref() {
            Some(token) => {
                token.cancel(CancelReason::Abort);
                true
            }
            None => false,
        };

        let Some(live) = self.inner.live.lock().take() else {
            return cancelled;
        };
        let id = live.id;
        let discarded = live.release(&self.inner.audio);
        let previous = self.set_idle();
        log::info!("[{}] capture aborted, {} chunk(s) discarded", id, discarded.len());
        self.inner
            .delegates
            .emit(|d| d.on_state_changed(CaptureState::Idle, previous));
        true
    }

    /// One timer period elapsed. Counts only while recording.
    pub(crate) fn tick(&self) {
        let elapsed = {
            let mut status = self.inner.status.lock();
            if !status.state.is_recording() {
                return;
            }
            status.elapsed_secs += 1;
            status.elapsed_secs
        };
        self.inner.delegates.emit(|d| d.on_elapsed(elapsed));
    }

    fn acquire(
        &self,
        id: Uuid,
        config: &CaptureConfiguration,
        token: &CancelToken,
    ) -> Result<LiveSession, CaptureError> {
        let display = self.inner.provider.get_display_media(
            &config.quality.display_constraints(),
            config.audio_source.requests_system(),
        )?;
        let mut live = LiveSession::new(id, display);

        match self.prepare(&mut live, config, token) {
            Ok(()) => Ok(live),
            Err(e) => {
                live.release(&self.inner.audio);
                Err(e)
            }
        }
    }

    fn prepare(
        &self,
        live: &mut LiveSession,
        config: &CaptureConfiguration,
        token: &CancelToken,
    ) -> Result<(), CaptureError> {
        let id = live.id;
        let hub = &self.inner.delegates;

        // Ending the shared display (e.g. the platform's "stop sharing")
        // stops the recording, or cancels a start still in progress.
        if let Some(video) = live.display.video_tracks().first() {
            let weak = Arc::downgrade(&self.inner);
            let token = token.clone();
            video.on_ended(Arc::new(move || {
                log::info!("[{}] display capture ended", id);
                token.cancel(CancelReason::SourceEnded);
                if let Some(inner) = weak.upgrade() {
                    CaptureSession { inner }.stop_if_current(id);
                }
            }));
        }
        hub.emit(|d| d.on_preview(&Preview::LiveDisplay(live.display.clone())));

        if config.audio_source.requests_mic() {
            match self.inner.provider.get_microphone() {
                Ok(mic) => live.microphone = Some(mic),
                Err(e) => {
                    log::warn!("[{}] microphone unavailable: {}", id, e);
                    let notice = Notice::MicrophoneUnavailable(e.to_string());
                    hub.emit(|d| d.on_notice(&notice));
                }
            }
        }

        let audio = &self.inner.audio;
        let system = live
            .display
            .has_audio()
            .then(|| live.display.audio_only());
        let (audio_tracks, mic_tap, system_tap) = match (system, live.microphone.as_ref()) {
            (Some(system), Some(mic)) if config.audio_source == AudioSourceMode::Both => (
                audio.mix(&[&system, mic])?,
                Some(audio.level_of(mic)?),
                Some(audio.level_of(&system)?),
            ),
            (Some(system), _) if config.audio_source.requests_system() => {
                (system.audio_tracks(), None, Some(audio.level_of(&system)?))
            }
            (_, Some(mic)) => (mic.audio_tracks(), Some(audio.level_of(mic)?), None),
            _ => (Vec::new(), None, None),
        };
        if config.audio_source.requests_system() && system_tap.is_none() {
            log::debug!("[{}] display shared without audio", id);
        }

        let meter_hub = hub.clone();
        live.meter = Some(LevelMeter::start(
            mic_tap,
            system_tap,
            config.meter_interval(),
            move |levels| meter_hub.emit(|d| d.on_levels_updated(levels)),
        )?);

        let mut tracks = live.display.video_tracks();
        tracks.extend(audio_tracks);
        let combined = MediaStream::new(tracks);

        let mime = negotiate_mime(config.format, |m| self.inner.encoders.is_type_supported(m))
            .ok_or(CaptureError::NoSupportedFormat)?;
        live.mime = mime.to_string();

        let chunks = Arc::clone(&live.chunks);
        let encoder = self.inner.encoders.create(
            &combined,
            &EncoderOptions {
                mime_type: mime.to_string(),
                video_bits_per_second: config.quality.video_bitrate(),
            },
            Arc::new(move |chunk: Bytes| {
                if !chunk.is_empty() {
                    chunks.lock().push(chunk);
                }
            }),
        )?;
        live.combined = Some(combined);
        live.encoder = Some(encoder);
        log::debug!("[{}] encoder ready: {}", id, mime);

        run_countdown(
            config.countdown_steps,
            config.countdown_interval(),
            token,
            |remaining| hub.emit(|d| d.on_countdown(remaining)),
        )?;

        if let Some(encoder) = live.encoder.as_mut() {
            encoder.start()?;
        }

        if config.webcam_enabled {
            let result = self.open_camera(live);
            self.announce_camera(result);
        }

        let weak = Arc::downgrade(&self.inner);
        live.timer = Some(Ticker::spawn("capture-timer", config.tick_interval(), move || {
            if let Some(inner) = weak.upgrade() {
                CaptureSession { inner }.tick();
            }
        })?);
        Ok(())
    }

    fn open_camera(&self, live: &mut LiveSession) -> Result<MediaStream, CaptureError> {
        if let Some(camera) = &live.camera {
            return Ok(camera.clone());
        }
        let camera = self
            .inner
            .provider
            .get_camera(&CameraConstraints::default())?;
        live.camera = Some(camera.clone());
        Ok(camera)
    }

    fn announce_camera(&self, result: Result<MediaStream, CaptureError>) {
        match result {
            Ok(camera) => self
                .inner
                .delegates
                .emit(|d| d.on_preview(&Preview::Webcam(Some(camera.clone())))),
            Err(e) => {
                log::warn!("webcam unavailable: {}", e);
                let notice = Notice::WebcamUnavailable(e.to_string());
                self.inner.delegates.emit(|d| d.on_notice(&notice));
            }
        }
    }

    fn stop_if_current(&self, id: Uuid) {
        let live = {
            let mut guard = self.inner.live.lock();
            if guard.as_ref().map(|l| l.id) != Some(id) {
                return;
            }
            guard.take()
        };
        if let Some(live) = live {
            self.finish(live);
        }
    }

    fn set_idle(&self) -> CaptureState {
        std::mem::replace(&mut self.inner.status.lock().state, CaptureState::Idle)
    }

    fn finish(&self, mut live: LiveSession) -> RecordingOutcome {
        let id = live.id;
        let mime = live.finish_encoder();
        let chunks = live.release(&self.inner.audio);

        let previous = self.set_idle();
        let duration = self.elapsed_secs();
        self.inner
            .delegates
            .emit(|d| d.on_state_changed(CaptureState::Idle, previous));

        let mut blob = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
        for chunk in &chunks {
            blob.extend_from_slice(chunk);
        }

        let completed = Local::now();
        let filename = recording_filename(&completed, &mime);
        let mut artifact = Artifact::from_blob(
            blob.freeze(),
            filename.clone(),
            duration,
            mime,
            completed.with_timezone(&Utc),
        );
        log::info!(
            "[{}] capture stopped: {} ({}, {})",
            id,
            filename,
            format_elapsed(duration),
            format_size(artifact.size)
        );

        let added = self.inner.library.add(artifact.clone());
        artifact.id = added.id;
        self.inner.library.set_preview(Some(&filename));

        let preview = Preview::Recording {
            filename: filename.clone(),
            view_url: added.view_url.clone(),
        };
        self.inner.delegates.emit(|d| d.on_preview(&preview));

        let notice = match &added.persist_error {
            Some(e) => Notice::RecordingUnsaved(e.clone()),
            None => Notice::RecordingReady { filename },
        };
        self.inner.delegates.emit(|d| d.on_notice(&notice));

        let outcome = RecordingOutcome {
            session_id: id,
            artifact,
            view_url: added.view_url,
            persist_error: added.persist_error,
        };
        self.inner
            .delegates
            .emit(|d| d.on_capture_finished(&outcome));
        outcome
    }
}
