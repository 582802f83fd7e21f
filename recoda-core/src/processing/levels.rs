//! Level metering math on analyser byte-frequency data.

use crate::traits::audio_graph::LevelTap;

/// Segments in one level meter.
pub const METER_SEGMENTS: usize = 24;

/// Readouts at or below this are shown as silence.
pub const SILENCE_DB: i32 = -60;

/// Analyser node settings used for every level tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyserOptions {
    pub fft_size: u32,
    pub smoothing_time_constant: f32,
}

impl Default for AnalyserOptions {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing_time_constant: 0.75,
        }
    }
}

/// Colour band of a lit meter segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentZone {
    Green,
    Yellow,
    Red,
}

/// Average of byte-frequency bins, normalized to 0.0–1.0.
pub fn average_level(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|&b| b as u64).sum();
    (sum as f32 / bins.len() as f32) / 255.0
}

/// Sample a tap once. Missing taps read as silence.
pub fn sample_level(tap: Option<&dyn LevelTap>) -> f32 {
    tap.map(|t| average_level(&t.frequency_data())).unwrap_or(0.0)
}

/// Whole-decibel readout, or `None` at or below the silence floor.
pub fn level_to_db(level: f32) -> Option<i32> {
    if level <= 0.0 {
        return None;
    }
    let db = (20.0 * level.log10()).round() as i32;
    (db > SILENCE_DB).then_some(db)
}

/// `-12dB`, or an em dash for silence.
pub fn format_db(level: f32) -> String {
    match level_to_db(level) {
        Some(db) => format!("{}dB", db),
        None => "\u{2014}".to_string(),
    }
}

/// How many of the meter's segments are lit at `level`.
pub fn lit_segments(level: f32) -> usize {
    ((level.clamp(0.0, 1.0) * METER_SEGMENTS as f32).round() as usize).min(METER_SEGMENTS)
}

pub fn segment_zone(index: usize) -> SegmentZone {
    let pct = index as f32 / METER_SEGMENTS as f32;
    if pct < 0.6 {
        SegmentZone::Green
    } else if pct < 0.85 {
        SegmentZone::Yellow
    } else {
        SegmentZone::Red
    }
}
