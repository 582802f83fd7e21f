use std::sync::Arc;

use bytes::Bytes;

use crate::models::error::CaptureError;
use crate::traits::media::MediaStream;

/// Receives encoded chunks as the encoder produces them.
pub type ChunkCallback = Arc<dyn Fn(Bytes) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    Inactive,
    Recording,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    pub mime_type: String,
    pub video_bits_per_second: u32,
}

/// An opaque platform media encoder.
pub trait Encoder: Send {
    /// Content type the encoder actually produces.
    fn mime_type(&self) -> String;

    fn state(&self) -> EncoderState;

    fn start(&mut self) -> Result<(), CaptureError>;

    fn pause(&mut self) -> Result<(), CaptureError>;

    fn resume(&mut self) -> Result<(), CaptureError>;

    /// Stop encoding. All pending data is delivered through the chunk
    /// callback before this returns.
    fn stop(&mut self) -> Result<(), CaptureError>;
}

pub trait EncoderFactory: Send + Sync {
    fn is_type_supported(&self, mime: &str) -> bool;

    fn create(
        &self,
        stream: &MediaStream,
        options: &EncoderOptions,
        on_chunk: ChunkCallback,
    ) -> Result<Box<dyn Encoder>, CaptureError>;
}
