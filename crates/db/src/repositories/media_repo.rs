//! In-memory media store.
//!
//! Known references resolve to `{base_url}/{media_ref}`. Releases are
//! recorded so tests can assert which references a deletion gave back.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use folio_core::ports::{MediaError, MediaStore};
use folio_core::types::MediaRef;
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct InMemoryMediaRepo {
    base_url: String,
    known: RwLock<HashSet<MediaRef>>,
    released: RwLock<Vec<MediaRef>>,
    failing: AtomicBool,
}

impl InMemoryMediaRepo {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            known: RwLock::new(HashSet::new()),
            released: RwLock::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make `media_ref` resolvable, as an upload would.
    pub async fn register(&self, media_ref: impl Into<MediaRef>) {
        self.known.write().await.insert(media_ref.into());
    }

    /// References released so far, in release order.
    pub async fn released(&self) -> Vec<MediaRef> {
        self.released.read().await.clone()
    }

    /// When set, every call fails with [`MediaError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), MediaError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MediaError::Unavailable("media store offline".to_string()));
        }
        Ok(())
    }
}

impl MediaStore for InMemoryMediaRepo {
    async fn resolve_display_url(&self, media_ref: &str) -> Result<String, MediaError> {
        self.check_available()?;
        if !self.known.read().await.contains(media_ref) {
            return Err(MediaError::NotFound(media_ref.to_string()));
        }
        Ok(format!("{}/{media_ref}", self.base_url))
    }

    async fn release(&self, media_ref: &str) -> Result<(), MediaError> {
        self.check_available()?;
        if !self.known.write().await.remove(media_ref) {
            return Err(MediaError::NotFound(media_ref.to_string()));
        }
        self.released.write().await.push(media_ref.to_string());
        tracing::debug!(media_ref = %media_ref, "Media released");
        Ok(())
    }
}
