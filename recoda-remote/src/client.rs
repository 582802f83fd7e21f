use bytes::Bytes;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use recoda_core::models::remote::{
    CompanionRecording, DownloadedBlob, ManifestEntry, NewRecording, RemoteRecording, RemoteUser,
    SignedUpload, SyncPlan, SyncRequest,
};
use recoda_core::{Artifact, CompanionServer, RemoteCollaborator, SignedTransfer, SyncError};

use crate::config::RemoteConfig;
use crate::error::{check, network, RemoteError};

#[derive(Serialize)]
struct SignRequest<'a> {
    filename: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserBody {
    Wrapped { user: RemoteUser },
    Bare(RemoteUser),
}

#[derive(Deserialize)]
struct SaveResponse {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Blocking HTTP client for the recordings API, signed object transfers
/// and the companion server.
pub struct HttpRemote {
    config: RemoteConfig,
    base: Url,
    client: Client,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        config.validate()?;
        let base = config.base_url()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Resolve an API path or a signed reference. Absolute URLs pass
    /// through unchanged.
    fn resolve(&self, path: &str) -> Result<Url, SyncError> {
        self.base
            .join(path)
            .map_err(|e| SyncError::Protocol(format!("bad URL {:?}: {}", path, e)))
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SyncError> {
        let response = check(request.send().map_err(network)?)?;
        response.json::<T>().map_err(|e| SyncError::Protocol(e.to_string()))
    }

    fn get_json<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, SyncError> {
        let url = self.resolve(path)?;
        log::debug!("GET {}", url);
        self.send_json(self.client.get(url).bearer_auth(token))
    }

    fn post_json<B, T>(&self, token: &str, path: &str, body: &B) -> Result<T, SyncError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        log::debug!("POST {}", url);
        self.send_json(self.client.post(url).bearer_auth(token).json(body))
    }

    fn fetch_blob(&self, request: RequestBuilder) -> Result<DownloadedBlob, SyncError> {
        let response = check(request.send().map_err(network)?)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().map_err(network)?;
        Ok(DownloadedBlob {
            bytes,
            content_type,
        })
    }
}

impl RemoteCollaborator for HttpRemote {
    fn current_user(&self, token: &str) -> Result<RemoteUser, SyncError> {
        match self.get_json::<UserBody>(token, "api/auth/user")? {
            UserBody::Wrapped { user } | UserBody::Bare(user) => Ok(user),
        }
    }

    fn list_recordings(&self, token: &str) -> Result<Vec<RemoteRecording>, SyncError> {
        self.get_json(token, "api/recordings")
    }

    fn register_recording(
        &self,
        token: &str,
        recording: &NewRecording,
    ) -> Result<RemoteRecording, SyncError> {
        self.post_json(token, "api/recordings", recording)
    }

    fn diff(&self, token: &str, manifest: &[ManifestEntry]) -> Result<SyncPlan, SyncError> {
        let request = SyncRequest {
            local_recordings: manifest.to_vec(),
        };
        self.post_json(token, "api/recordings/sync", &request)
    }

    fn sign_upload(&self, token: &str, filename: &str) -> Result<SignedUpload, SyncError> {
        self.post_json(token, "api/upload/sign", &SignRequest { filename })
    }
}

impl SignedTransfer for HttpRemote {
    fn upload(&self, target: &SignedUpload, body: Bytes, content_type: &str) -> Result<(), SyncError> {
        let url = self.resolve(&target.signed_url)?;
        log::debug!("PUT {} ({} bytes, {})", target.path, body.len(), content_type);
        check(
            self.client
                .put(url)
                .header(CONTENT_TYPE, content_type)
                .body(body.to_vec())
                .send()
                .map_err(network)?,
        )?;
        Ok(())
    }

    fn download(&self, url: &str) -> Result<DownloadedBlob, SyncError> {
        let url = self.resolve(url)?;
        self.fetch_blob(self.client.get(url))
    }
}

impl CompanionServer for HttpRemote {
    fn list(&self, token: &str) -> Result<Vec<CompanionRecording>, SyncError> {
        self.get_json(token, "api/local/recordings")
    }

    fn fetch(&self, token: &str, filename: &str) -> Result<DownloadedBlob, SyncError> {
        let url = self.resolve(&format!("api/local/file/{}", urlencoding::encode(filename)))?;
        self.fetch_blob(self.client.get(url).bearer_auth(token))
    }

    fn save(&self, token: &str, artifact: &Artifact, body: Bytes) -> Result<(), SyncError> {
        let file = Part::bytes(body.to_vec())
            .file_name(artifact.filename.clone())
            .mime_str(&artifact.mime)
            .map_err(|e| SyncError::Protocol(format!("bad mime {:?}: {}", artifact.mime, e)))?;
        let form = Form::new()
            .part("file", file)
            .text("filename", artifact.filename.clone())
            .text("duration", artifact.duration_secs.to_string())
            .text("mime", artifact.mime.clone())
            .text(
                "ts",
                artifact.created_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            );

        let url = self.resolve("api/local/save")?;
        log::debug!("POST {} ({})", url, artifact.filename);
        let response: SaveResponse =
            self.send_json(self.client.post(url).bearer_auth(token).multipart(form))?;
        if !response.success {
            return Err(SyncError::Server {
                status: 200,
                message: response
                    .message
                    .unwrap_or_else(|| "companion server refused the recording".into()),
            });
        }
        Ok(())
    }
}
