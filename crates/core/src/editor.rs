//! Optimistic editing reducer: the client-side mirror of the builder service.
//!
//! [`EditorState`] replays the same structural verbs as the builder through
//! the same [`crate::ordering`] functions and the same merge/validation
//! rules, so a locally previewed order always matches what the builder
//! computes for the same sequence of operations.
//!
//! The reducer is synchronous and never talks to the builder. A surrounding
//! controller saves remotely and then dispatches [`EditorAction::MarkClean`]
//! or [`EditorAction::Revert`]. Those two and [`EditorAction::Load`] are the
//! only actions that clear `is_dirty`. Operations that are impossible on the
//! local copy (unknown block id, invalid payload) are silent no-ops.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{self, Block};
use crate::ordering;
use crate::portfolio::{self, Portfolio, TemplateKind};
use crate::types::BlockId;

/// Display width the editor previews at. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Desktop,
    Mobile,
}

/// Verbs accepted by [`EditorState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EditorAction {
    /// Replace the working copy with a freshly loaded portfolio (clean).
    Load(Portfolio),
    /// Insert a block; `position: None` appends.
    AddBlock {
        block: Block,
        position: Option<usize>,
    },
    /// Shallow-merge `patch` into the block's payload.
    UpdateBlock { block_id: BlockId, patch: Value },
    DeleteBlock { block_id: BlockId },
    MoveBlock { block_id: BlockId, to_index: usize },
    ReorderBlocks { block_ids: Vec<BlockId> },
    SetTemplate(TemplateKind),
    SetTheme(String),
    SetTitle(String),
    SelectBlock(Option<BlockId>),
    SetPreview(bool),
    TogglePreview,
    SetViewport(Viewport),
    /// The remote save succeeded: the working copy becomes the saved snapshot.
    MarkClean,
    /// The remote save failed: roll back to the last saved snapshot.
    Revert,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub portfolio: Portfolio,
    /// Last snapshot known to match the server.
    pub last_saved: Portfolio,
    /// Weak reference: looked up by id, cleared when the block disappears.
    pub selected_block_id: Option<BlockId>,
    pub is_dirty: bool,
    pub is_preview: bool,
    pub viewport: Viewport,
}

impl EditorState {
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            last_saved: portfolio.clone(),
            portfolio,
            selected_block_id: None,
            is_dirty: false,
            is_preview: false,
            viewport: Viewport::default(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.portfolio.blocks
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected_block_id
            .as_deref()
            .and_then(|id| self.portfolio.block(id))
    }

    /// Apply one action in place.
    pub fn apply(&mut self, action: EditorAction) {
        match action {
            EditorAction::Load(portfolio) => {
                self.last_saved = portfolio.clone();
                self.portfolio = portfolio;
                self.is_dirty = false;
                self.drop_stale_selection();
            }
            EditorAction::AddBlock { block, position } => self.add_block(block, position),
            EditorAction::UpdateBlock { block_id, patch } => self.update_block(&block_id, &patch),
            EditorAction::DeleteBlock { block_id } => {
                if self.portfolio.contains_block(&block_id) {
                    let blocks = ordering::remove_by_id(&self.portfolio.blocks, &block_id);
                    self.commit_blocks(blocks);
                }
            }
            EditorAction::MoveBlock { block_id, to_index } => {
                if self.portfolio.contains_block(&block_id) {
                    let blocks = ordering::move_to(&self.portfolio.blocks, &block_id, to_index);
                    if blocks != self.portfolio.blocks {
                        self.commit_blocks(blocks);
                    }
                }
            }
            EditorAction::ReorderBlocks { block_ids } => {
                let blocks =
                    ordering::reorder_by_explicit_sequence(&self.portfolio.blocks, &block_ids);
                self.commit_blocks(blocks);
            }
            EditorAction::SetTemplate(template) => {
                self.portfolio.template = template;
                self.is_dirty = true;
            }
            EditorAction::SetTheme(theme) => {
                self.portfolio.theme = theme;
                self.is_dirty = true;
            }
            EditorAction::SetTitle(title) => {
                if portfolio::validate_title(&title).is_ok() {
                    self.portfolio.title = title;
                    self.is_dirty = true;
                }
            }
            EditorAction::SelectBlock(block_id) => {
                self.selected_block_id = block_id.filter(|id| self.portfolio.contains_block(id));
            }
            EditorAction::SetPreview(on) => self.is_preview = on,
            EditorAction::TogglePreview => self.is_preview = !self.is_preview,
            EditorAction::SetViewport(viewport) => self.viewport = viewport,
            EditorAction::MarkClean => {
                self.last_saved = self.portfolio.clone();
                self.is_dirty = false;
            }
            EditorAction::Revert => {
                self.portfolio = self.last_saved.clone();
                self.is_dirty = false;
                self.drop_stale_selection();
            }
        }
    }

    fn add_block(&mut self, block: Block, position: Option<usize>) {
        if self.portfolio.contains_block(&block.id) {
            return;
        }
        let block = Block {
            content: block.content.sanitized(),
            ..block
        };
        if !block::validate(&block.content).is_valid() {
            return;
        }
        let index = position.unwrap_or(self.portfolio.blocks.len());
        let id = block.id.clone();
        let blocks = ordering::insert_at(&self.portfolio.blocks, block, index);
        self.commit_blocks(blocks);
        self.selected_block_id = Some(id);
    }

    fn update_block(&mut self, block_id: &str, patch: &Value) {
        let Some(existing) = self.portfolio.block(block_id) else {
            return;
        };
        let Ok(content) = existing.content.merged(patch) else {
            return;
        };
        if !block::validate(&content).is_valid() {
            return;
        }
        if let Some(block) = self
            .portfolio
            .blocks
            .iter_mut()
            .find(|block| block.id == block_id)
        {
            block.content = content;
            self.is_dirty = true;
        }
    }

    fn commit_blocks(&mut self, blocks: Vec<Block>) {
        self.portfolio.blocks = blocks;
        self.is_dirty = true;
        self.drop_stale_selection();
    }

    fn drop_stale_selection(&mut self) {
        if self.selected_block().is_none() {
            self.selected_block_id = None;
        }
    }
}

/// Functional form of [`EditorState::apply`].
pub fn reduce(mut state: EditorState, action: EditorAction) -> EditorState {
    state.apply(action);
    state
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
