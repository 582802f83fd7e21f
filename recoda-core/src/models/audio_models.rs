use serde::{Deserialize, Serialize};

use crate::processing::levels;

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Live level readings (0.0–1.0). `None` when the source is not metered.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioLevels {
    pub mic: Option<f32>,
    pub system: Option<f32>,
}

impl AudioLevels {
    pub fn mic_db(&self) -> Option<i32> {
        self.mic.and_then(levels::level_to_db)
    }

    pub fn system_db(&self) -> Option<i32> {
        self.system.and_then(levels::level_to_db)
    }
}
