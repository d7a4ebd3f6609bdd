//! Portfolio DTOs and the list summary view.

use folio_core::block::Block;
use folio_core::portfolio::{Portfolio, TemplateKind};
use folio_core::types::{PortfolioId, Timestamp};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Lightweight listing entry for an owner's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub id: PortfolioId,
    pub title: String,
    pub template: TemplateKind,
    pub is_published: bool,
    pub slug: Option<String>,
    pub block_count: usize,
    pub updated_at: Timestamp,
}

impl From<&Portfolio> for PortfolioSummary {
    fn from(portfolio: &Portfolio) -> Self {
        Self {
            id: portfolio.id.clone(),
            title: portfolio.title.clone(),
            template: portfolio.template,
            is_published: portfolio.is_published(),
            slug: portfolio.public_slug().map(str::to_string),
            block_count: portfolio.blocks.len(),
            updated_at: portfolio.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a portfolio. Omitted template and theme fall back to
/// the builder's configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePortfolio {
    pub title: String,
    pub template: Option<TemplateKind>,
    pub theme: Option<String>,
}

/// DTO for partially updating a portfolio.
///
/// `blocks`, when present, replaces the whole block list. Every block is
/// re-validated and the replacement is applied atomically.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePortfolio {
    pub title: Option<String>,
    pub template: Option<TemplateKind>,
    pub theme: Option<String>,
    pub blocks: Option<Vec<Block>>,
}

impl UpdatePortfolio {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.template.is_none()
            && self.theme.is_none()
            && self.blocks.is_none()
    }
}
