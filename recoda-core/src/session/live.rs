use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::processing::audio_mixer::AudioMixer;
use crate::session::meter::LevelMeter;
use crate::session::ticker::Ticker;
use crate::traits::encoder::{Encoder, EncoderState};
use crate::traits::media::MediaStream;

/// Every external resource held by one capture session.
///
/// Built up step by step during start; `release` gives everything back in
/// one place, whether start failed halfway or the session ran to the end.
pub(crate) struct LiveSession {
    pub id: Uuid,
    pub display: MediaStream,
    pub microphone: Option<MediaStream>,
    pub camera: Option<MediaStream>,
    pub combined: Option<MediaStream>,
    pub encoder: Option<Box<dyn Encoder>>,
    pub mime: String,
    pub chunks: Arc<Mutex<Vec<Bytes>>>,
    pub meter: Option<LevelMeter>,
    pub timer: Option<Ticker>,
}

impl LiveSession {
    pub fn new(id: Uuid, display: MediaStream) -> Self {
        Self {
            id,
            display,
            microphone: None,
            camera: None,
            combined: None,
            encoder: None,
            mime: String::new(),
            chunks: Arc::new(Mutex::new(Vec::new())),
            meter: None,
            timer: None,
        }
    }

    /// Stop the encoder if it is still running and report the content type
    /// it produced.
    pub fn finish_encoder(&mut self) -> String {
        let Some(encoder) = self.encoder.as_mut() else {
            return self.mime.clone();
        };
        if encoder.state() != EncoderState::Inactive {
            if let Err(e) = encoder.stop() {
                log::warn!("[{}] encoder stop failed: {}", self.id, e);
            }
        }
        let reported = encoder.mime_type();
        if reported.is_empty() {
            self.mime.clone()
        } else {
            reported
        }
    }

    pub fn close_camera(&mut self) -> bool {
        match self.camera.take() {
            Some(camera) => {
                camera.stop_all();
                true
            }
            None => false,
        }
    }

    /// Release every resource and hand back the collected chunks.
    pub fn release(mut self, audio: &AudioMixer) -> Vec<Bytes> {
        if let Some(mut meter) = self.meter.take() {
            meter.stop();
        }
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
        self.finish_encoder();
        self.encoder = None;

        self.display.stop_all();
        if let Some(mic) = self.microphone.take() {
            mic.stop_all();
        }
        self.close_camera();
        self.combined = None;

        audio.close();
        log::debug!("[{}] resources released", self.id);

        std::mem::take(&mut *self.chunks.lock())
    }
}
