use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Local store key. Assigned by the store, monotonic, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub u64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Container family a recording was encoded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeFormat {
    Mp4,
    Webm,
}

impl NativeFormat {
    pub fn from_mime(mime: &str) -> Self {
        if mime.contains("mp4") {
            Self::Mp4
        } else {
            Self::Webm
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
            Some(ext) if ext == "mp4" => Some(Self::Mp4),
            Some(ext) if ext == "webm" => Some(Self::Webm),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    /// Bare container MIME type, without codec parameters.
    pub fn container_mime(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }
}

impl fmt::Display for NativeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mp4 => "MP4",
            Self::Webm => "WebM",
        })
    }
}

/// Where the media bytes of an artifact live.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPayload {
    /// Encoded media held in memory (recorded here or downloaded by sync).
    Blob(Bytes),
    /// Media kept by the companion server, fetched on demand.
    Companion { reference: String },
}

/// One completed recording: media payload plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub id: Option<ArtifactId>,
    pub filename: String,
    pub duration_secs: u64,
    pub mime: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub synced: bool,
    pub payload: ArtifactPayload,
}

impl Artifact {
    /// A fresh, unsaved, unsynced artifact wrapping `blob`.
    pub fn from_blob(
        blob: Bytes,
        filename: impl Into<String>,
        duration_secs: u64,
        mime: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            filename: filename.into(),
            duration_secs,
            mime: mime.into(),
            size: blob.len() as u64,
            created_at,
            synced: false,
            payload: ArtifactPayload::Blob(blob),
        }
    }

    pub fn with_synced(mut self, synced: bool) -> Self {
        self.synced = synced;
        self
    }

    pub fn native_format(&self) -> NativeFormat {
        NativeFormat::from_mime(&self.mime)
    }

    pub fn blob(&self) -> Option<&Bytes> {
        match &self.payload {
            ArtifactPayload::Blob(blob) => Some(blob),
            ArtifactPayload::Companion { .. } => None,
        }
    }

    pub fn is_companion(&self) -> bool {
        matches!(self.payload, ArtifactPayload::Companion { .. })
    }
}

/// `rec-YYYY-MM-DD_HH-MM.<ext>`, from the capture completion time.
pub fn recording_filename<Tz>(completed_at: &DateTime<Tz>, mime: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "rec-{}.{}",
        completed_at.format("%Y-%m-%d_%H-%M"),
        NativeFormat::from_mime(mime).extension()
    )
}

/// `HH:MM:SS`
pub fn format_elapsed(total_secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

pub fn format_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn native_format_follows_mime() {
        assert_eq!(NativeFormat::from_mime("video/mp4;codecs=avc1,opus"), NativeFormat::Mp4);
        assert_eq!(NativeFormat::from_mime("video/webm;codecs=vp9,opus"), NativeFormat::Webm);
        assert_eq!(NativeFormat::from_mime(""), NativeFormat::Webm);
    }

    #[test]
    fn native_format_from_filename() {
        assert_eq!(NativeFormat::from_filename("rec-2024-01-01_10-00.MP4"), Some(NativeFormat::Mp4));
        assert_eq!(NativeFormat::from_filename("rec.webm"), Some(NativeFormat::Webm));
        assert_eq!(NativeFormat::from_filename("notes.txt"), None);
        assert_eq!(NativeFormat::from_filename("noext"), None);
    }

    #[test]
    fn filename_uses_completion_minute_and_extension() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let at = tz.with_ymd_and_hms(2024, 6, 1, 9, 30, 59).unwrap();

        assert_eq!(recording_filename(&at, "video/webm"), "rec-2024-06-01_09-30.webm");
        assert_eq!(recording_filename(&at, "video/mp4;codecs=avc1"), "rec-2024-06-01_09-30.mp4");
    }

    #[test]
    fn elapsed_is_zero_padded() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(8), "00:00:08");
        assert_eq!(format_elapsed(3725), "01:02:05");
    }

    #[test]
    fn size_in_megabytes() {
        assert_eq!(format_size(204_800), "0.2 MB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn from_blob_measures_size() {
        let artifact = Artifact::from_blob(Bytes::from_static(b"abcd"), "a.webm", 3, "video/webm", Utc::now());
        assert_eq!(artifact.size, 4);
        assert!(!artifact.synced);
        assert!(artifact.id.is_none());
        assert_eq!(artifact.blob().map(|b| b.len()), Some(4));
    }
}
