//! Template renderer: a pure mapping from (template, blocks) to a render plan.
//!
//! The template decides wrapper and slot choices only. It never reorders,
//! drops or validates blocks. Input is normalized first because callers may
//! hand over blocks straight from storage in any order.

use std::collections::HashMap;

use serde::Serialize;

use crate::block::{Alignment, Block, BlockContent, BlockKind, PLACEHOLDER_MEDIA};
use crate::ordering;
use crate::portfolio::TemplateKind;
use crate::types::{BlockId, MediaRef};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Container width of the gallery template (pixels).
pub const GALLERY_MAX_WIDTH: u32 = 1200;

/// Container width of the about template (pixels).
pub const ABOUT_MAX_WIDTH: u32 = 720;

/// Container width of the contact template (pixels).
pub const CONTACT_MAX_WIDTH: u32 = 640;

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

/// Page wrapper chosen by the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLayout {
    pub max_width: u32,
    pub text_align: Alignment,
    pub section_spacing: u32,
}

/// Where a block sits inside the page wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Constrained to the container width.
    Content,
    /// Spans the full viewport width.
    FullBleed,
    /// Prominent call to action (contact links).
    CallToAction,
}

/// A media reference and, once resolved, its display URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub reference: MediaRef,
    pub url: Option<String>,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub block_id: BlockId,
    pub position: usize,
    pub kind: BlockKind,
    pub slot: Slot,
    pub content: BlockContent,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub template: TemplateKind,
    pub layout: PageLayout,
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    /// Distinct non-placeholder media references, in render order.
    pub fn media_refs(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = Vec::new();
        for item in &self.items {
            for media in &item.media {
                if !media.placeholder && !refs.contains(&media.reference.as_str()) {
                    refs.push(&media.reference);
                }
            }
        }
        refs
    }

    /// Attach display URLs. References missing from `urls` keep `url: None`.
    pub fn with_media_urls(mut self, urls: &HashMap<String, String>) -> Self {
        for item in &mut self.items {
            for media in &mut item.media {
                if !media.placeholder {
                    media.url = urls.get(&media.reference).cloned();
                }
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Build the render plan for `blocks` under `template`.
pub fn render_plan(template: TemplateKind, blocks: &[Block]) -> RenderPlan {
    let items = ordering::normalize(blocks)
        .into_iter()
        .map(|block| RenderItem {
            slot: slot_for(template, block.kind()),
            kind: block.kind(),
            media: media_items(&block.content),
            block_id: block.id,
            position: block.position,
            content: block.content,
        })
        .collect();

    RenderPlan {
        template,
        layout: layout_for(template),
        items,
    }
}

fn layout_for(template: TemplateKind) -> PageLayout {
    match template {
        TemplateKind::Gallery => PageLayout {
            max_width: GALLERY_MAX_WIDTH,
            text_align: Alignment::Left,
            section_spacing: 48,
        },
        TemplateKind::About => PageLayout {
            max_width: ABOUT_MAX_WIDTH,
            text_align: Alignment::Left,
            section_spacing: 32,
        },
        TemplateKind::Contact => PageLayout {
            max_width: CONTACT_MAX_WIDTH,
            text_align: Alignment::Center,
            section_spacing: 24,
        },
    }
}

fn slot_for(template: TemplateKind, kind: BlockKind) -> Slot {
    match (template, kind) {
        (TemplateKind::Gallery, BlockKind::Images | BlockKind::Carousel) => Slot::FullBleed,
        (TemplateKind::Contact, BlockKind::Link) => Slot::CallToAction,
        _ => Slot::Content,
    }
}

fn media_items(content: &BlockContent) -> Vec<MediaItem> {
    let refs: &[MediaRef] = match content {
        BlockContent::Images(block) => &block.images,
        BlockContent::Carousel(block) => &block.images,
        _ => &[],
    };
    refs.iter()
        .map(|reference| MediaItem {
            reference: reference.clone(),
            url: None,
            placeholder: reference == PLACEHOLDER_MEDIA,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
