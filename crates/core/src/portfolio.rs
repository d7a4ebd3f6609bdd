//! Portfolio aggregate: identity, metadata, ordered blocks and publish state.
//!
//! The aggregate exclusively owns its blocks. All structural changes go
//! through [`crate::ordering`], so `blocks` is always dense and in position
//! order once it has passed through any method here.

use serde::{Deserialize, Serialize};

use crate::block::{self, Block, BlockValidation};
use crate::error::CoreError;
use crate::ordering;
use crate::types::{BlockId, OwnerId, PortfolioId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum characters in a portfolio title.
pub const MAX_PORTFOLIO_TITLE_LENGTH: usize = 120;

/// Theme used when none is given.
pub const DEFAULT_THEME: &str = "default";

/// Suffix appended to the title of a duplicated portfolio.
pub const COPY_SUFFIX: &str = " (Copy)";

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Page template. Affects layout only, never validation or ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Gallery,
    About,
    Contact,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::Gallery,
        TemplateKind::About,
        TemplateKind::Contact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Gallery => "gallery",
            TemplateKind::About => "about",
            TemplateKind::Contact => "contact",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|template| template.as_str() == name)
            .ok_or_else(|| {
                CoreError::validation(
                    "template",
                    format!("Unknown template '{name}'. Must be one of: gallery, about, contact"),
                )
            })
    }
}

// ---------------------------------------------------------------------------
// Publish state
// ---------------------------------------------------------------------------

/// `Draft` (private) or `Published` (addressable by its slug).
///
/// A draft keeps the slug minted by an earlier publish as `reserved_slug`.
/// It is not public while drafted, but re-publishing restores exactly that
/// slug instead of minting a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PublishState {
    Draft {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reserved_slug: Option<String>,
    },
    Published {
        slug: String,
    },
}

impl Default for PublishState {
    fn default() -> Self {
        PublishState::Draft {
            reserved_slug: None,
        }
    }
}

/// What a publish toggle actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishTransition {
    /// Draft -> Published with a freshly minted slug.
    PublishedNewSlug,
    /// Draft -> Published, restoring the reserved slug.
    PublishedReservedSlug,
    /// Published -> Draft.
    Unpublished,
    /// Already in the requested state.
    Unchanged,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub owner_id: OwnerId,
    pub title: String,
    pub template: TemplateKind,
    pub theme: String,
    pub blocks: Vec<Block>,
    pub publish_state: PublishState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Portfolio {
    /// A new empty draft.
    pub fn new(
        id: impl Into<PortfolioId>,
        owner_id: impl Into<OwnerId>,
        title: impl Into<String>,
        template: TemplateKind,
        theme: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self {
            id: id.into(),
            owner_id: owner_id.into(),
            title,
            template,
            theme: theme.into(),
            blocks: Vec::new(),
            publish_state: PublishState::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Public slug, present only while published.
    pub fn public_slug(&self) -> Option<&str> {
        match &self.publish_state {
            PublishState::Published { slug } => Some(slug),
            PublishState::Draft { .. } => None,
        }
    }

    /// Any slug ever minted for this portfolio, published or reserved.
    pub fn minted_slug(&self) -> Option<&str> {
        match &self.publish_state {
            PublishState::Published { slug } => Some(slug),
            PublishState::Draft { reserved_slug } => reserved_slug.as_deref(),
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self.publish_state, PublishState::Published { .. })
    }

    /// Draft -> Published. `mint` is called only when no slug was ever minted.
    pub fn publish<F>(&mut self, mint: F) -> Result<PublishTransition, CoreError>
    where
        F: FnOnce() -> Result<String, CoreError>,
    {
        let (slug, transition) = match &self.publish_state {
            PublishState::Published { .. } => return Ok(PublishTransition::Unchanged),
            PublishState::Draft {
                reserved_slug: Some(slug),
            } => (slug.clone(), PublishTransition::PublishedReservedSlug),
            PublishState::Draft {
                reserved_slug: None,
            } => (mint()?, PublishTransition::PublishedNewSlug),
        };
        self.publish_state = PublishState::Published { slug };
        Ok(transition)
    }

    /// Published -> Draft. The public slug is cleared and kept in reserve.
    pub fn unpublish(&mut self) -> PublishTransition {
        match std::mem::take(&mut self.publish_state) {
            PublishState::Published { slug } => {
                self.publish_state = PublishState::Draft {
                    reserved_slug: Some(slug),
                };
                PublishTransition::Unpublished
            }
            draft => {
                self.publish_state = draft;
                PublishTransition::Unchanged
            }
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), CoreError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        Ok(())
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn contains_block(&self, id: &str) -> bool {
        self.block(id).is_some()
    }

    /// Replace the whole block list after validating every block.
    ///
    /// All-or-nothing: on the first invalid block nothing changes. Duplicate
    /// ids are rejected. Accepted blocks are sanitized and normalized.
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) -> Result<(), CoreError> {
        let blocks = prepare_blocks(blocks)?;
        self.blocks = ordering::normalize(&blocks);
        Ok(())
    }

    /// Media references held by all blocks, in block order, placeholders excluded.
    pub fn media_refs(&self) -> Vec<String> {
        let mut refs: Vec<String> = Vec::new();
        for block in &self.blocks {
            for media in block.content.media_refs() {
                if !refs.iter().any(|seen| seen == media) {
                    refs.push(media.to_string());
                }
            }
        }
        refs
    }

    /// Deep copy under a new identity: every block gets a fresh id from
    /// `mint_block_id`, the copy is a draft with no slug, and the title gets
    /// [`COPY_SUFFIX`] (truncated to fit the title limit).
    pub fn duplicate_as<F>(
        &self,
        new_id: impl Into<PortfolioId>,
        mut mint_block_id: F,
        now: Timestamp,
    ) -> Self
    where
        F: FnMut() -> BlockId,
    {
        let blocks = ordering::normalize(&self.blocks)
            .into_iter()
            .map(|block| Block {
                id: mint_block_id(),
                ..block
            })
            .collect();

        Self {
            id: new_id.into(),
            owner_id: self.owner_id.clone(),
            title: copy_title(&self.title),
            template: self.template,
            theme: self.theme.clone(),
            blocks,
            publish_state: PublishState::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Stamp a modification time.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a portfolio title: non-blank and within [`MAX_PORTFOLIO_TITLE_LENGTH`].
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::validation("title", "must not be empty"));
    }
    let len = title.chars().count();
    if len > MAX_PORTFOLIO_TITLE_LENGTH {
        return Err(CoreError::validation(
            "title",
            format!("must not exceed {MAX_PORTFOLIO_TITLE_LENGTH} characters, got {len}"),
        ));
    }
    Ok(())
}

/// Sanitize and validate a candidate block list, rejecting duplicate ids.
fn prepare_blocks(blocks: Vec<Block>) -> Result<Vec<Block>, CoreError> {
    let mut prepared: Vec<Block> = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.into_iter().enumerate() {
        if prepared.iter().any(|seen| seen.id == block.id) {
            return Err(CoreError::validation(
                format!("blocks[{index}].id"),
                format!("duplicate block id '{}'", block.id),
            ));
        }
        let block = Block {
            content: block.content.sanitized(),
            ..block
        };
        let report = block::validate(&block.content);
        if !report.is_valid() {
            return Err(prefixed(report, index));
        }
        prepared.push(block);
    }
    Ok(prepared)
}

fn prefixed(report: BlockValidation, index: usize) -> CoreError {
    match report.errors.into_iter().next() {
        Some(issue) => {
            CoreError::validation(format!("blocks[{index}].{}", issue.field), issue.reason)
        }
        None => CoreError::validation(format!("blocks[{index}]"), "invalid block"),
    }
}

fn copy_title(title: &str) -> String {
    let room = MAX_PORTFOLIO_TITLE_LENGTH - COPY_SUFFIX.chars().count();
    let base: String = title.chars().take(room).collect();
    format!("{base}{COPY_SUFFIX}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
