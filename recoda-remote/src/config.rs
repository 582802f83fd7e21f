use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RemoteError;

/// Where the recordings API and companion server live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the recordings API (default: `http://localhost:3001`).
    pub api_base: String,

    /// Per-request timeout in seconds (default: 60). Covers blob transfers.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:3001".to_string(),
            timeout_secs: 60,
        }
    }
}

impl RemoteConfig {
    pub fn from_file(path: &Path) -> Result<Self, RemoteError> {
        let content = std::fs::read_to_string(path).map_err(|e| RemoteError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| RemoteError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RemoteError> {
        if self.timeout_secs == 0 {
            return Err(RemoteError::InvalidConfig("timeout_secs must be positive".into()));
        }
        self.base_url().map(|_| ())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `api_base` parsed, with a trailing slash so relative joins keep any
    /// path prefix.
    pub fn base_url(&self) -> Result<Url, RemoteError> {
        let mut base = self.api_base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let url = Url::parse(&base)
            .map_err(|e| RemoteError::InvalidConfig(format!("api_base {:?}: {}", self.api_base, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(RemoteError::InvalidConfig(format!(
                "api_base must be http or https, got {}",
                other
            ))),
        }
    }
}
