use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::processing::levels::AnalyserOptions;
use crate::traits::media::{MediaStream, MediaTrack};

/// Read side of an analyser node.
pub trait LevelTap: Send + Sync {
    /// Current byte-frequency bins (0–255). Must not block.
    fn frequency_data(&self) -> Vec<u8>;
}

/// A live audio processing graph shared by one capture session.
pub trait AudioGraph: Send + Sync {
    /// Route every input into one common destination and return its tracks.
    fn mix(&self, inputs: &[&MediaStream]) -> Result<Vec<Arc<dyn MediaTrack>>, CaptureError>;

    /// Attach an analyser to `stream`.
    fn analyser(
        &self,
        stream: &MediaStream,
        options: AnalyserOptions,
    ) -> Result<Arc<dyn LevelTap>, CaptureError>;

    /// Tear the graph down. Taps and mixed tracks go dead.
    fn close(&self);
}

/// Factory for audio graphs.
pub trait AudioBackend: Send + Sync {
    fn create_graph(&self) -> Result<Arc<dyn AudioGraph>, CaptureError>;
}
