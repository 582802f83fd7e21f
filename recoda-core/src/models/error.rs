use thiserror::Error;

use super::artifact::{ArtifactId, NativeFormat};

/// Errors raised while acquiring sources or driving a capture session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("capture aborted")]
    CaptureAborted,

    #[error("no supported recording format")]
    NoSupportedFormat,

    #[error("device not available: {0}")]
    DeviceUnavailable(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// The user declined or cancelled a capture prompt.
    pub fn is_permission_style(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::CaptureAborted)
    }

    /// Message shown to the user when a start attempt fails.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => {
                "Screen capture denied. Please allow access to record.".to_string()
            }
            Self::CaptureAborted => "Screen capture was cancelled.".to_string(),
            Self::NoSupportedFormat => {
                "Recording is not supported here: no WebM or MP4 encoder is available.".to_string()
            }
            other => format!("Error: {}", other),
        }
    }
}

/// Errors raised by the local artifact store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(String),

    #[error("failed to serialize record: {0}")]
    Serialization(String),

    #[error("record {id} is corrupt: {reason}")]
    Corrupt { id: ArtifactId, reason: String },

    #[error("recording {0} has no local payload")]
    MissingPayload(String),

    #[error("unsupported store version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Which way an item was moving when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Upload,
    Download,
}

/// One failed item of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub filename: String,
    pub direction: TransferDirection,
    pub reason: String,
}

/// Errors raised while reconciling with the remote collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("session expired")]
    AuthExpired,

    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("transfer of {filename} failed: {reason}")]
    Transfer { filename: String, reason: String },

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("sync finished with {count} failed item(s)", count = .0.failures.len())]
    Partial(Box<crate::sync::engine::SyncReport>),
}

/// Errors raised by library operations requested directly by the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("recording {0} not found")]
    NotFound(String),

    #[error("{filename} was recorded as {native}; it cannot be saved as {requested}")]
    FormatMismatch {
        filename: String,
        native: NativeFormat,
        requested: NativeFormat,
    },

    #[error("recording {0} has no local payload")]
    NoLocalPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] SyncError),
}
