//! Collaborator interfaces consumed by the builder service.
//!
//! Persistence and media storage are external to this workspace's core. The
//! builder depends only on these traits; `folio-db` ships in-memory
//! implementations used for tests and local wiring.

use std::fmt;
use std::future::Future;

use crate::error::CoreError;
use crate::portfolio::Portfolio;

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Aggregate-level persistence for portfolios.
///
/// Every write replaces the whole aggregate atomically. Backend failures are
/// reported as [`CoreError::Internal`].
pub trait PortfolioStore: Send + Sync {
    /// Load a portfolio by id, regardless of owner.
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Portfolio>, CoreError>> + Send;

    /// Load the published portfolio whose public slug is `slug`.
    ///
    /// Drafts (including drafts holding a reserved slug) are never returned.
    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Portfolio>, CoreError>> + Send;

    /// All portfolios owned by `owner_id`.
    fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<Portfolio>, CoreError>> + Send;

    /// Returns `true` if any portfolio holds `slug`, published or reserved.
    fn slug_in_use(&self, slug: &str) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Insert or atomically replace the full aggregate.
    fn save(&self, portfolio: &Portfolio) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Delete by id. Returns `true` if a portfolio was removed.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Errors reported by the media collaborator.
#[derive(Debug)]
pub enum MediaError {
    /// The reference does not exist in the media store.
    NotFound(String),
    /// The store could not be reached or refused the request.
    Unavailable(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(media) => write!(f, "Media not found: {media}"),
            Self::Unavailable(msg) => write!(f, "Media store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for MediaError {}

/// Opaque media capability: turn a reference into a display URL, and give a
/// reference back when its owner is deleted.
pub trait MediaStore: Send + Sync {
    fn resolve_display_url(
        &self,
        media_ref: &str,
    ) -> impl Future<Output = Result<String, MediaError>> + Send;

    /// Best-effort release; callers log failures instead of propagating them.
    fn release(&self, media_ref: &str) -> impl Future<Output = Result<(), MediaError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = MediaError::NotFound("m1".to_string());
        assert_eq!(err.to_string(), "Media not found: m1");
    }

    #[test]
    fn display_unavailable() {
        let err = MediaError::Unavailable("timeout".to_string());
        assert_eq!(err.to_string(), "Media store unavailable: timeout");
    }

    #[test]
    fn media_error_has_no_source() {
        let err = MediaError::Unavailable("x".to_string());
        assert!(std::error::Error::source(&err).is_none());
    }
}
