//! # recoda-core
//!
//! Platform-agnostic screen recorder core.
//!
//! Drives a capture session from display acquisition to a finished
//! recording, keeps recordings in a local artifact store, and reconciles
//! that store with a remote collaborator. Platform backends implement the
//! `CaptureProvider`, `EncoderFactory` and `AudioBackend` traits; HTTP
//! backends implement the traits in `traits::remote`.
//!
//! ## Architecture
//!
//! ```text
//! recoda-core (this crate)
//! ├── traits/       ← CaptureProvider, EncoderFactory, AudioBackend, CaptureDelegate,
//! │                   ArtifactStore, RemoteCollaborator, SignedTransfer, CompanionServer
//! ├── models/       ← CaptureError, CaptureState, CaptureConfiguration, Artifact, wire types
//! ├── processing/   ← AudioMixer, level metering, format negotiation
//! ├── session/      ← CaptureSession (state machine), countdown, timer, delegate hub
//! ├── storage/      ← LocalStore, record metadata, playback views
//! ├── library       ← in-memory recordings list, playback, export, companion
//! └── sync/         ← SyncEngine, manifest, session token
//! ```

pub mod library;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod sync;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use library::{AddOutcome, CompanionLink, EntrySnapshot, ExportTarget, Library, Playback, SyncAvailability};
pub use models::artifact::{Artifact, ArtifactId, ArtifactPayload, NativeFormat};
pub use models::audio_models::{AudioLevels, TrackKind};
pub use models::config::{AudioSourceMode, CaptureConfiguration, FormatPreference, VideoQuality};
pub use models::error::{CaptureError, ItemFailure, LibraryError, StoreError, SyncError, TransferDirection};
pub use models::events::{Notice, Preview};
pub use models::recording_result::RecordingOutcome;
pub use models::state::CaptureState;
pub use session::capture::CaptureSession;
pub use session::events::Subscription;
pub use storage::local_store::LocalStore;
pub use storage::views::{BlobView, ViewRegistry};
pub use sync::engine::{SyncConfig, SyncEngine, SyncPolicy, SyncReport};
pub use sync::session::StaticSession;
pub use traits::audio_graph::{AudioBackend, AudioGraph, LevelTap};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::capture_provider::CaptureProvider;
pub use traits::encoder::{ChunkCallback, Encoder, EncoderFactory, EncoderOptions, EncoderState};
pub use traits::media::{EndedCallback, MediaStream, MediaTrack};
pub use traits::remote::{CompanionServer, RemoteCollaborator, SessionProvider, SignedTransfer};
pub use traits::store::{ArtifactStore, LoadedArtifact};
