//! # recoda-remote
//!
//! HTTP backend for `recoda-core`: implements `RemoteCollaborator`,
//! `SignedTransfer` and `CompanionServer` over a blocking `reqwest` client.
//!
//! ```text
//! SyncEngine ─→ HttpRemote ─→ /api/auth/user, /api/recordings, /api/recordings/sync,
//!                             /api/upload/sign, signed PUT/GET
//! Library ───→ HttpRemote ─→ /api/local/recordings, /api/local/file/:name, /api/local/save
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpRemote;
pub use config::RemoteConfig;
pub use error::RemoteError;
