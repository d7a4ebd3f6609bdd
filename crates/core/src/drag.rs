//! Drag/drop resolution for the builder canvas.
//!
//! Drop targets are the gaps between rendered blocks: gap `0` is above the
//! first block and gap `n` below the last, so `n` blocks have `n + 1` gaps.
//! Resolution only decides which ordering operation to issue and with which
//! arguments. It validates and persists nothing.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockKind};
use crate::editor::EditorAction;
use crate::types::BlockId;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DragItem {
    /// A palette entry: only a kind, no identity yet.
    Palette { kind: BlockKind },
    /// A block already on the canvas at `index`.
    Instance { block_id: BlockId, index: usize },
}

/// The ordering operation a drop resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum DropOperation {
    AddBlock { kind: BlockKind, position: usize },
    MoveBlock { block_id: BlockId, to_index: usize },
    /// Dropping a block next to itself: nothing moves.
    NoOp,
}

impl DropOperation {
    /// Turn the resolution into an editor action. `mint_id` supplies the
    /// identity of a block created from the palette.
    pub fn into_action<F>(self, mint_id: F) -> Option<EditorAction>
    where
        F: FnOnce() -> BlockId,
    {
        match self {
            DropOperation::AddBlock { kind, position } => Some(EditorAction::AddBlock {
                block: Block::with_defaults(mint_id(), kind),
                position: Some(position),
            }),
            DropOperation::MoveBlock { block_id, to_index } => {
                Some(EditorAction::MoveBlock { block_id, to_index })
            }
            DropOperation::NoOp => None,
        }
    }
}

/// Resolve a drop of `item` onto gap `gap`.
///
/// A palette entry becomes an insert at the gap. An existing block dropped on
/// either gap adjacent to itself (`index` or `index + 1`) is a no-op. Further
/// down, the landing index is `gap - 1` because the block leaves its own slot
/// before it is reinserted.
pub fn resolve_drop(item: &DragItem, gap: usize) -> DropOperation {
    match item {
        DragItem::Palette { kind } => DropOperation::AddBlock {
            kind: *kind,
            position: gap,
        },
        DragItem::Instance { block_id, index } => {
            let index = *index;
            if gap == index || gap == index + 1 {
                DropOperation::NoOp
            } else {
                let to_index = if gap > index { gap - 1 } else { gap };
                DropOperation::MoveBlock {
                    block_id: block_id.clone(),
                    to_index,
                }
            }
        }
    }
}

/// Vertical extent of one rendered block, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockBounds {
    pub top: f64,
    pub height: f64,
}

impl BlockBounds {
    fn midline(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Gap under a pointer at `pointer_y`: the number of blocks whose midline is
/// above the pointer. `bounds` are given in render order.
pub fn gap_for_pointer(bounds: &[BlockBounds], pointer_y: f64) -> usize {
    bounds
        .iter()
        .take_while(|block| block.midline() <= pointer_y)
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
