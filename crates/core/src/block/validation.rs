//! Structural validators, one per block kind.
//!
//! Validation looks only at the payload itself (shape, bounds, format). It
//! never consults sibling blocks or the owning portfolio.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use validator::ValidateUrl;

use super::{
    BlockContent, BlockKind, CarouselBlock, DividerBlock, ImagesBlock, LinkBlock, ListBlock,
    ResumeBlock, RichTextBlock, TitleBlock, MAX_CAROUSEL_IMAGES, MAX_DIVIDER_THICKNESS,
    MAX_GRID_COLUMNS, MAX_GRID_IMAGES, MAX_LINK_TEXT_LENGTH, MAX_LIST_ITEMS, MAX_RESUME_ENTRIES,
    MAX_RESUME_SECTIONS, MAX_RICHTEXT_LENGTH, MAX_TITLE_LENGTH, MIN_DIVIDER_THICKNESS,
};
use crate::error::CoreError;

/// `#RGB` or `#RRGGBB`.
static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// A single problem with one field of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Dotted path into the payload, e.g. `sections[0].entries[2].title`.
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of validating one payload. Valid when `errors` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockValidation {
    pub errors: Vec<FieldIssue>,
}

impl BlockValidation {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldIssue::new(field, reason)],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable `field: reason` lines.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.reason))
            .collect()
    }

    /// Convert into a [`CoreError::ValidationFailed`] carrying the first issue.
    pub fn into_result(self) -> Result<(), CoreError> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(issue) => Err(CoreError::ValidationFailed {
                field: issue.field,
                reason: issue.reason,
            }),
        }
    }

    fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(FieldIssue::new(field, reason));
    }
}

impl From<FieldIssue> for BlockValidation {
    fn from(issue: FieldIssue) -> Self {
        Self {
            errors: vec![issue],
        }
    }
}

impl From<BlockValidation> for CoreError {
    fn from(report: BlockValidation) -> Self {
        report
            .into_result()
            .err()
            .unwrap_or_else(|| CoreError::validation("data", "invalid block"))
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Validate a typed payload.
pub fn validate(content: &BlockContent) -> BlockValidation {
    match content {
        BlockContent::Title(block) => validate_title(block),
        BlockContent::RichText(block) => validate_richtext(block),
        BlockContent::List(block) => validate_list(block),
        BlockContent::Images(block) => validate_images(block),
        BlockContent::Resume(block) => validate_resume(block),
        BlockContent::Carousel(block) => validate_carousel(block),
        BlockContent::Divider(block) => validate_divider(block),
        BlockContent::Link(block) => validate_link(block),
    }
}

/// Validate untyped input: an unknown `kind` or a payload of the wrong shape
/// is a failure, never a silent no-op.
pub fn validate_raw(kind: &str, data: &Value) -> BlockValidation {
    if let Err(issue) = BlockKind::from_name(kind) {
        return issue.into();
    }
    let mut tagged = data.clone();
    match &mut tagged {
        Value::Object(fields) => {
            fields.insert("kind".to_string(), Value::String(kind.to_string()));
        }
        _ => return BlockValidation::single("data", "must be a JSON object"),
    }
    match serde_json::from_value::<BlockContent>(tagged) {
        Ok(content) => validate(&content),
        Err(e) => BlockValidation::single("data", e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Per-kind validators
// ---------------------------------------------------------------------------

fn validate_title(block: &TitleBlock) -> BlockValidation {
    let mut report = BlockValidation::default();
    check_text(&mut report, "text", &block.text, MAX_TITLE_LENGTH);
    if !(1..=6).contains(&block.level) {
        report.push(
            "level",
            format!("must be between 1 and 6, got {}", block.level),
        );
    }
    report
}

fn validate_richtext(block: &RichTextBlock) -> BlockValidation {
    let mut report = BlockValidation::default();
    let len = block.html.chars().count();
    if len > MAX_RICHTEXT_LENGTH {
        report.push(
            "html",
            format!("must not exceed {MAX_RICHTEXT_LENGTH} characters, got {len}"),
        );
    }
    report
}

fn validate_list(block: &ListBlock) -> BlockValidation {
    let mut report = BlockValidation::default();
    check_count(&mut report, "items", block.items.len(), 1, MAX_LIST_ITEMS);
    for (i, item) in block.items.iter().enumerate() {
        if item.trim().is_empty() {
            report.push(format!("items[{i}]"), "must not be empty");
        }
    }
    report
}

fn validate_images(block: &ImagesBlock) -> BlockValidation {
    let mut report = BlockValidation::default();
    check_count(&mut report, "images", block.images.len(), 1, MAX_GRID_IMAGES);
    check_media_refs(&mut report, "images", &block.images);
    if let Some(columns) = block.columns {
        if !(1..=MAX_GRID_COLUMNS).contains(&columns) {
            report.push(
                "columns",
                format!("must be between 1 and {MAX_GRID_COLUMNS}, got {columns}"),
            );
        }
    }
    report
}

fn validate_resume(block: &ResumeBlock) -> BlockValidation {
    let mut report = BlockValidation::default();
    check_count(
        &mut report,
        "sections",
        block.sections.len(),
        1,
        MAX_RESUME_SECTIONS,
    );
    for (s, section) in block.sections.iter().enumerate() {
        if section.title.trim().is_empty() {
            report.push(format!("sections[{s}].title"), "must not be empty");
        }
        check_count(
            &mut report,
            &format!("sections[{s}].entries"),
            section.entries.len(),
            1,
            MAX_RESUME_ENTRIES,
        );
        for (e, entry) in section.entries.iter().enumerate() {
            if entry.title.trim().is_empty() {
                report.push(
                    format!("sections[{s}].entries[{e}].title"),
                    "must not be empty",
                );
            }
        }
    }
    report
}

fn validate_carousel(block: &CarouselBlock) -> BlockValidation {
    let mut report = BlockValidation::default();
    check_count(
        &mut report,
        "images",
        block.images.len(),
        1,
        MAX_CAROUSEL_IMAGES,
    );
    check_media_refs(&mut report, "images", &block.images);
    report
}

fn validate_divider(block: &DividerBlock) -> BlockValidation {
    let mut report = BlockValidation::default();
    if !(MIN_DIVIDER_THICKNESS..=MAX_DIVIDER_THICKNESS).contains(&block.thickness) {
        report.push(
            "thickness",
            format!(
                "must be between {MIN_DIVIDER_THICKNESS} and {MAX_DIVIDER_THICKNESS}, got {}",
                block.thickness
            ),
        );
    }
    if let Some(color) = &block.color {
        if !is_hex_color(color) {
            report.push(
                "color",
                format!("must be a #RGB or #RRGGBB hex color, got '{color}'"),
            );
        }
    }
    report
}

fn validate_link(block: &LinkBlock) -> BlockValidation {
    let mut report = BlockValidation::default();
    check_text(&mut report, "text", &block.text, MAX_LINK_TEXT_LENGTH);
    if !is_http_url(&block.url) {
        report.push(
            "url",
            format!("must be an absolute http or https URL, got '{}'", block.url),
        );
    }
    report
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_text(report: &mut BlockValidation, field: &str, text: &str, max: usize) {
    if text.trim().is_empty() {
        report.push(field, "must not be empty");
        return;
    }
    let len = text.chars().count();
    if len > max {
        report.push(field, format!("must not exceed {max} characters, got {len}"));
    }
}

fn check_count(report: &mut BlockValidation, field: &str, count: usize, min: usize, max: usize) {
    if count < min || count > max {
        report.push(
            field,
            format!("must contain between {min} and {max} entries, got {count}"),
        );
    }
}

fn check_media_refs(report: &mut BlockValidation, field: &str, refs: &[String]) {
    for (i, media) in refs.iter().enumerate() {
        if media.trim().is_empty() {
            report.push(format!("{field}[{i}]"), "must not be empty");
        }
    }
}

/// Returns `true` for `#RGB` / `#RRGGBB`.
pub(crate) fn is_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

/// Returns `true` when `url` parses as an absolute http(s) URL.
pub(crate) fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    let has_scheme = lower.starts_with("http://") || lower.starts_with("https://");
    has_scheme && url.to_owned().validate_url()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
