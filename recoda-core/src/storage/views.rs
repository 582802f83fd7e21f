use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use bytes::Bytes;
use parking_lot::Mutex;

/// Registry of transient playback handles over in-memory blobs.
///
/// Every handle is backed by an entry here until its `BlobView` is dropped.
#[derive(Default)]
pub struct ViewRegistry {
    views: Mutex<HashMap<String, Bytes>>,
}

impl ViewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn create(self: &Arc<Self>, blob: Bytes) -> BlobView {
        let url = format!("blob:recoda/{}", uuid::Uuid::new_v4());
        self.views.lock().insert(url.clone(), blob);
        BlobView {
            url,
            registry: Arc::downgrade(self),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.views.lock().get(url).cloned()
    }

    /// Handles not yet released.
    pub fn live_count(&self) -> usize {
        self.views.lock().len()
    }

    fn revoke(&self, url: &str) {
        self.views.lock().remove(url);
    }
}

/// A playback handle. Revoked on drop.
pub struct BlobView {
    url: String,
    registry: Weak<ViewRegistry>,
}

impl BlobView {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for BlobView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlobView").field(&self.url).finish()
    }
}

impl Drop for BlobView {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.revoke(&self.url);
        }
    }
}
