//! Block variant schema (the 8 content kinds a portfolio is built from).
//!
//! A [`Block`] pairs a stable identity and an engine-maintained position with
//! a [`BlockContent`] payload. Payloads serialize with an inline `kind`
//! discriminator so untyped client input (`kind` + JSON data) maps directly
//! onto the enum, and every kind has a default payload that validates as-is.

mod sanitize;
mod validation;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{BlockId, MediaRef};

pub use sanitize::sanitize_markup;
pub use validation::{validate, validate_raw, BlockValidation, FieldIssue};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Media reference used by default payloads before anything is uploaded.
///
/// Never resolved through or released to the media collaborator.
pub const PLACEHOLDER_MEDIA: &str = "placeholder";

/// Maximum characters in a title block.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum characters of sanitized rich text markup.
pub const MAX_RICHTEXT_LENGTH: usize = 10_000;

/// Maximum number of items in a list block.
pub const MAX_LIST_ITEMS: usize = 50;

/// Maximum number of images in an image grid.
pub const MAX_GRID_IMAGES: usize = 20;

/// Maximum number of grid columns.
pub const MAX_GRID_COLUMNS: u8 = 6;

/// Maximum number of sections in a resume.
pub const MAX_RESUME_SECTIONS: usize = 10;

/// Maximum number of entries in one resume section.
pub const MAX_RESUME_ENTRIES: usize = 20;

/// Maximum number of slides in a carousel.
pub const MAX_CAROUSEL_IMAGES: usize = 10;

/// Divider thickness bounds in pixels.
pub const MIN_DIVIDER_THICKNESS: u8 = 1;
pub const MAX_DIVIDER_THICKNESS: u8 = 10;

/// Maximum characters of link text.
pub const MAX_LINK_TEXT_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Kind discriminator
// ---------------------------------------------------------------------------

/// Fieldless discriminator of [`BlockContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Title,
    RichText,
    List,
    Images,
    Resume,
    Carousel,
    Divider,
    Link,
}

impl BlockKind {
    /// Every kind, in palette order.
    pub const ALL: [BlockKind; 8] = [
        BlockKind::Title,
        BlockKind::RichText,
        BlockKind::List,
        BlockKind::Images,
        BlockKind::Resume,
        BlockKind::Carousel,
        BlockKind::Divider,
        BlockKind::Link,
    ];

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Title => "title",
            BlockKind::RichText => "richtext",
            BlockKind::List => "list",
            BlockKind::Images => "images",
            BlockKind::Resume => "resume",
            BlockKind::Carousel => "carousel",
            BlockKind::Divider => "divider",
            BlockKind::Link => "link",
        }
    }

    /// Parse a wire name. Unknown names are a validation failure.
    pub fn from_name(name: &str) -> Result<Self, FieldIssue> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| {
                FieldIssue::new(
                    "kind",
                    format!(
                        "Unknown block kind '{name}'. Must be one of: {}",
                        Self::ALL.map(BlockKind::as_str).join(", ")
                    ),
                )
            })
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleBlock {
    pub text: String,
    pub level: u8,
    #[serde(default)]
    pub align: Alignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListBlock {
    pub items: Vec<String>,
    #[serde(default)]
    pub ordered: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageLayout {
    #[default]
    Grid,
    Masonry,
    Single,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagesBlock {
    pub images: Vec<MediaRef>,
    #[serde(default)]
    pub layout: ImageLayout,
    #[serde(default)]
    pub columns: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSection {
    pub title: String,
    pub entries: Vec<ResumeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeBlock {
    pub sections: Vec<ResumeSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselBlock {
    pub images: Vec<MediaRef>,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default = "default_true")]
    pub show_indicators: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividerBlock {
    #[serde(default)]
    pub style: DividerStyle,
    pub thickness: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    #[default]
    Button,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBlock {
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub open_in_new_tab: bool,
    #[serde(default)]
    pub style: LinkStyle,
}

fn default_true() -> bool {
    true
}

/// Payload of a block, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlockContent {
    Title(TitleBlock),
    RichText(RichTextBlock),
    List(ListBlock),
    Images(ImagesBlock),
    Resume(ResumeBlock),
    Carousel(CarouselBlock),
    Divider(DividerBlock),
    Link(LinkBlock),
}

impl BlockContent {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Title(_) => BlockKind::Title,
            BlockContent::RichText(_) => BlockKind::RichText,
            BlockContent::List(_) => BlockKind::List,
            BlockContent::Images(_) => BlockKind::Images,
            BlockContent::Resume(_) => BlockKind::Resume,
            BlockContent::Carousel(_) => BlockKind::Carousel,
            BlockContent::Divider(_) => BlockKind::Divider,
            BlockContent::Link(_) => BlockKind::Link,
        }
    }

    /// Minimal payload for `kind` that passes [`validate`] unmodified.
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Title => BlockContent::Title(TitleBlock {
                text: "Your heading".to_string(),
                level: 2,
                align: Alignment::Left,
            }),
            BlockKind::RichText => BlockContent::RichText(RichTextBlock {
                html: "<p>Start writing here.</p>".to_string(),
            }),
            BlockKind::List => BlockContent::List(ListBlock {
                items: vec!["First item".to_string()],
                ordered: false,
            }),
            BlockKind::Images => BlockContent::Images(ImagesBlock {
                images: vec![PLACEHOLDER_MEDIA.to_string()],
                layout: ImageLayout::Grid,
                columns: Some(3),
            }),
            BlockKind::Resume => BlockContent::Resume(ResumeBlock {
                sections: vec![ResumeSection {
                    title: "Experience".to_string(),
                    entries: vec![ResumeEntry {
                        title: "Role".to_string(),
                        subtitle: None,
                        description: None,
                        date: None,
                    }],
                }],
            }),
            BlockKind::Carousel => BlockContent::Carousel(CarouselBlock {
                images: vec![PLACEHOLDER_MEDIA.to_string()],
                autoplay: false,
                show_indicators: true,
            }),
            BlockKind::Divider => BlockContent::Divider(DividerBlock {
                style: DividerStyle::Solid,
                thickness: 1,
                color: None,
            }),
            BlockKind::Link => BlockContent::Link(LinkBlock {
                text: "Visit link".to_string(),
                url: "https://example.com".to_string(),
                open_in_new_tab: true,
                style: LinkStyle::Button,
            }),
        }
    }

    /// Build a payload from untyped input: the default payload for `kind`
    /// with `data` (a JSON object, if given) merged over it.
    pub fn from_kind_and_data(kind: &str, data: Option<&Value>) -> Result<Self, BlockValidation> {
        let kind = BlockKind::from_name(kind).map_err(BlockValidation::from)?;
        let base = Self::default_for(kind);
        match data {
            None | Some(Value::Null) => Ok(base),
            Some(patch) => base.merged(patch),
        }
    }

    /// Shallow-merge a JSON object into this payload and re-read it.
    ///
    /// Top-level keys of `patch` replace the payload's keys; `kind` is
    /// ignored so a merge can never change the variant. Shape errors (wrong
    /// types, unknown enum values) come back as validation issues. The result
    /// is sanitized but not validated.
    pub fn merged(&self, patch: &Value) -> Result<Self, BlockValidation> {
        let Value::Object(patch) = patch else {
            return Err(BlockValidation::single("data", "must be a JSON object"));
        };

        let mut base = serde_json::to_value(self)
            .map_err(|e| BlockValidation::single("data", e.to_string()))?;
        if let Value::Object(fields) = &mut base {
            for (key, value) in patch {
                if key == "kind" {
                    continue;
                }
                fields.insert(key.clone(), value.clone());
            }
        }

        serde_json::from_value::<BlockContent>(base)
            .map(BlockContent::sanitized)
            .map_err(|e| BlockValidation::single("data", e.to_string()))
    }

    /// Apply write-time normalisation (rich text sanitation).
    pub fn sanitized(self) -> Self {
        match self {
            BlockContent::RichText(RichTextBlock { html }) => BlockContent::RichText(RichTextBlock {
                html: sanitize_markup(&html),
            }),
            other => other,
        }
    }

    /// Media references held by this payload, placeholders excluded.
    pub fn media_refs(&self) -> Vec<&str> {
        let refs: &[MediaRef] = match self {
            BlockContent::Images(block) => &block.images,
            BlockContent::Carousel(block) => &block.images,
            _ => &[],
        };
        refs.iter()
            .map(String::as_str)
            .filter(|r| *r != PLACEHOLDER_MEDIA)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A typed content unit owned by exactly one portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Dense zero-based rank, maintained by [`crate::ordering`].
    pub position: usize,
    pub content: BlockContent,
}

impl Block {
    /// A block not yet placed in any collection (position 0 until inserted).
    pub fn new(id: impl Into<BlockId>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            position: 0,
            content,
        }
    }

    /// A block holding the default payload for `kind`.
    pub fn with_defaults(id: impl Into<BlockId>, kind: BlockKind) -> Self {
        Self::new(id, BlockContent::default_for(kind))
    }

    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
