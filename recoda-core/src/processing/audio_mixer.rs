use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::processing::levels::AnalyserOptions;
use crate::traits::audio_graph::{AudioBackend, AudioGraph, LevelTap};
use crate::traits::media::{MediaStream, MediaTrack};

/// Owner of the shared audio graph.
///
/// The graph is created on first use and torn down by `close`, so the next
/// session always starts with a fresh one.
pub struct AudioMixer {
    backend: Arc<dyn AudioBackend>,
    graph: Mutex<Option<Arc<dyn AudioGraph>>>,
}

impl AudioMixer {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            graph: Mutex::new(None),
        }
    }

    fn graph(&self) -> Result<Arc<dyn AudioGraph>, CaptureError> {
        let mut guard = self.graph.lock();
        if let Some(graph) = guard.as_ref() {
            return Ok(Arc::clone(graph));
        }
        let graph = self.backend.create_graph()?;
        log::debug!("audio graph created");
        *guard = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// Mix zero, one or two inputs into one set of audio tracks.
    ///
    /// No inputs yields no tracks and does not create a graph.
    pub fn mix(&self, inputs: &[&MediaStream]) -> Result<Vec<Arc<dyn MediaTrack>>, CaptureError> {
        let inputs: Vec<&MediaStream> = inputs.iter().copied().filter(|s| s.has_audio()).collect();
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        self.graph()?.mix(&inputs)
    }

    /// Attach a level tap to `stream`.
    pub fn level_of(&self, stream: &MediaStream) -> Result<Arc<dyn LevelTap>, CaptureError> {
        self.graph()?.analyser(stream, AnalyserOptions::default())
    }

    pub fn is_open(&self) -> bool {
        self.graph.lock().is_some()
    }

    /// Close and clear the graph. Returns whether one was open.
    pub fn close(&self) -> bool {
        let graph = self.graph.lock().take();
        match graph {
            Some(graph) => {
                graph.close();
                log::debug!("audio graph closed");
                true
            }
            None => false,
        }
    }
}

impl Drop for AudioMixer {
    fn drop(&mut self) {
        self.close();
    }
}
