//! Ordering engine: pure functions that keep a block collection densely and
//! contiguously positioned.
//!
//! Every function takes a slice and returns a fresh `Vec<Block>` whose
//! positions are exactly `0..n`. Input order is never trusted: collections
//! are first sorted by `(position, original array index)` so duplicate or
//! gapped positions from external data resolve deterministically.

use crate::block::Block;

/// Sort by position (array index breaks ties) and re-label `0..n`.
pub fn normalize(blocks: &[Block]) -> Vec<Block> {
    let mut indexed: Vec<(usize, &Block)> = blocks.iter().enumerate().collect();
    indexed.sort_by_key(|(index, block)| (block.position, *index));
    relabel(indexed.into_iter().map(|(_, block)| block.clone()).collect())
}

/// Insert `block` at position `index`, clamped to `[0, len]`.
///
/// Every block whose stored position is `>= index` shifts down by one, the
/// new block takes `index`, and the result is normalized. Positions are
/// compared as stored, so on gapped input the new block lands between the
/// neighbours its position falls between.
pub fn insert_at(blocks: &[Block], block: Block, index: usize) -> Vec<Block> {
    let index = index.min(blocks.len());
    let mut shifted: Vec<Block> = blocks
        .iter()
        .cloned()
        .map(|mut existing| {
            if existing.position >= index {
                existing.position += 1;
            }
            existing
        })
        .collect();
    shifted.push(Block {
        position: index,
        ..block
    });
    normalize(&shifted)
}

/// Remove the block with `id` and close the gap.
///
/// An unknown `id` is a no-op that returns the input unchanged.
pub fn remove_by_id(blocks: &[Block], id: &str) -> Vec<Block> {
    if !contains(blocks, id) {
        return blocks.to_vec();
    }
    let ordered = normalize(blocks);
    relabel(ordered.into_iter().filter(|block| block.id != id).collect())
}

/// Move the block with `id` so that it ends up at `new_index`.
///
/// Equivalent to removing the block and re-inserting it at `new_index`
/// (clamped to the last index). Moving a block to the index it already
/// occupies, or moving an unknown id, returns the input unchanged.
pub fn move_to(blocks: &[Block], id: &str, new_index: usize) -> Vec<Block> {
    let ordered = normalize(blocks);
    let Some(current) = ordered.iter().position(|block| block.id == id) else {
        return blocks.to_vec();
    };
    let target = new_index.min(ordered.len() - 1);
    if target == current && ordered.as_slice() == blocks {
        return blocks.to_vec();
    }

    let mut ordered = ordered;
    let moving = ordered.remove(current);
    ordered.insert(target, moving);
    relabel(ordered)
}

/// Rebuild the collection from an explicit id sequence.
///
/// Blocks appear in the order their ids are listed. Ids that match no block,
/// and repeats of an id already placed, are ignored. Blocks whose ids are not
/// listed are dropped: the sequence is the new membership, so callers that
/// only want to reorder must pass every id.
pub fn reorder_by_explicit_sequence<S: AsRef<str>>(blocks: &[Block], ids: &[S]) -> Vec<Block> {
    let mut placed: Vec<Block> = Vec::with_capacity(ids.len().min(blocks.len()));
    for id in ids {
        let id = id.as_ref();
        if placed.iter().any(|block| block.id == id) {
            continue;
        }
        if let Some(block) = blocks.iter().find(|block| block.id == id) {
            placed.push(block.clone());
        }
    }
    relabel(placed)
}

/// Returns `true` when positions are exactly `0..n` in array order.
pub fn is_dense(blocks: &[Block]) -> bool {
    blocks
        .iter()
        .enumerate()
        .all(|(index, block)| block.position == index)
}

/// Position of the block with `id` in position order.
pub fn index_of(blocks: &[Block], id: &str) -> Option<usize> {
    normalize(blocks).iter().position(|block| block.id == id)
}

fn contains(blocks: &[Block], id: &str) -> bool {
    blocks.iter().any(|block| block.id == id)
}

fn relabel(mut blocks: Vec<Block>) -> Vec<Block> {
    for (index, block) in blocks.iter_mut().enumerate() {
        block.position = index;
    }
    blocks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
