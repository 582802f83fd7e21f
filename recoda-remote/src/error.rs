use reqwest::blocking::Response;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use recoda_core::SyncError;

/// Errors raised while setting up the HTTP backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("failed to read config {path}: {reason}")]
    ConfigRead { path: String, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub(crate) fn network(e: reqwest::Error) -> SyncError {
    if e.is_decode() {
        SyncError::Protocol(e.to_string())
    } else {
        SyncError::Network(e.to_string())
    }
}

/// Pass successful responses through; turn the rest into `SyncError`,
/// taking the message from a `{"error": ...}` body when there is one.
pub(crate) fn check(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(SyncError::AuthExpired);
    }

    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.error)
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    Err(SyncError::Server {
        status: status.as_u16(),
        message,
    })
}
