//! In-memory portfolio store.
//!
//! Aggregates are stored whole, keyed by id. `save` replaces the stored copy
//! in one write-locked step, so readers never observe a partial update.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use folio_core::error::CoreError;
use folio_core::portfolio::Portfolio;
use folio_core::ports::PortfolioStore;
use folio_core::types::PortfolioId;
use tokio::sync::RwLock;

/// Provides portfolio persistence backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryPortfolioRepo {
    portfolios: RwLock<HashMap<PortfolioId, Portfolio>>,
    unavailable: AtomicBool,
}

impl InMemoryPortfolioRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every operation fails with [`CoreError::Internal`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored portfolios.
    pub async fn len(&self) -> usize {
        self.portfolios.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), CoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::Internal("portfolio store unavailable".to_string()));
        }
        Ok(())
    }
}

impl PortfolioStore for InMemoryPortfolioRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Portfolio>, CoreError> {
        self.check_available()?;
        Ok(self.portfolios.read().await.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Portfolio>, CoreError> {
        self.check_available()?;
        let portfolios = self.portfolios.read().await;
        Ok(portfolios
            .values()
            .find(|portfolio| portfolio.public_slug() == Some(slug))
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>, CoreError> {
        self.check_available()?;
        let portfolios = self.portfolios.read().await;
        Ok(portfolios
            .values()
            .filter(|portfolio| portfolio.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn slug_in_use(&self, slug: &str) -> Result<bool, CoreError> {
        self.check_available()?;
        let portfolios = self.portfolios.read().await;
        Ok(portfolios
            .values()
            .any(|portfolio| portfolio.minted_slug() == Some(slug)))
    }

    async fn save(&self, portfolio: &Portfolio) -> Result<(), CoreError> {
        self.check_available()?;
        self.portfolios
            .write()
            .await
            .insert(portfolio.id.clone(), portfolio.clone());
        tracing::debug!(
            portfolio_id = %portfolio.id,
            blocks = portfolio.blocks.len(),
            "Portfolio saved",
        );
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        self.check_available()?;
        let removed = self.portfolios.write().await.remove(id).is_some();
        tracing::debug!(portfolio_id = %id, removed, "Portfolio delete");
        Ok(removed)
    }
}
