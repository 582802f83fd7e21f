use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Video quality tier. Picks display constraints and encoder bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoQuality {
    #[serde(rename = "720")]
    Standard,
    #[default]
    #[serde(rename = "1080")]
    High,
}

impl VideoQuality {
    pub fn display_constraints(self) -> DisplayConstraints {
        let (width, height) = match self {
            Self::Standard => (1280, 720),
            Self::High => (1920, 1080),
        };
        DisplayConstraints {
            ideal_width: width,
            ideal_height: height,
            show_cursor: true,
        }
    }

    /// Video bits per second handed to the encoder.
    pub fn video_bitrate(self) -> u32 {
        match self {
            Self::Standard => 2_500_000,
            Self::High => 5_000_000,
        }
    }
}

/// Which audio ends up in the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSourceMode {
    #[default]
    None,
    Mic,
    System,
    Both,
}

impl AudioSourceMode {
    pub fn requests_system(self) -> bool {
        matches!(self, Self::System | Self::Both)
    }

    pub fn requests_mic(self) -> bool {
        matches!(self, Self::Mic | Self::Both)
    }
}

/// Output container preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatPreference {
    /// MP4 when the encoder supports it, WebM otherwise.
    #[default]
    Auto,
    Mp4,
    Webm,
}

/// Constraints for the display-capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub show_cursor: bool,
}

/// Constraints for the webcam overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub width: u32,
    pub height: u32,
    pub facing_user: bool,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            facing_user: true,
        }
    }
}

/// Configuration for a capture session.
///
/// Only accepted while the session is idle; the webcam toggle is the one
/// setting that may change mid-recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfiguration {
    pub quality: VideoQuality,

    pub audio_source: AudioSourceMode,

    pub format: FormatPreference,

    /// Show a webcam overlay while recording (default: false).
    pub webcam_enabled: bool,

    /// Countdown steps before encoding starts (default: 3).
    pub countdown_steps: u8,

    /// Delay between countdown steps in milliseconds (default: 1000).
    pub countdown_interval_ms: u64,

    /// Elapsed-time counter resolution in milliseconds (default: 1000).
    pub tick_interval_ms: u64,

    /// Level sampling period in milliseconds (default: 16, roughly one frame).
    pub meter_interval_ms: u64,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.countdown_steps > 10 {
            return Err(format!("countdown too long: {} steps", self.countdown_steps));
        }
        if self.tick_interval_ms == 0 {
            return Err("tick interval must be positive".into());
        }
        if self.meter_interval_ms == 0 {
            return Err("meter interval must be positive".into());
        }
        Ok(())
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn meter_interval(&self) -> Duration {
        Duration::from_millis(self.meter_interval_ms)
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            quality: VideoQuality::default(),
            audio_source: AudioSourceMode::default(),
            format: FormatPreference::default(),
            webcam_enabled: false,
            countdown_steps: 3,
            countdown_interval_ms: 1000,
            tick_interval_ms: 1000,
            meter_interval_ms: 16,
        }
    }
}
