//! Folio block document model.
//!
//! Pure domain logic for block-based portfolio pages, with no I/O:
//!
//! - [`block`]: the eight block kinds, their defaults, validators and the
//!   rich-text sanitizer.
//! - [`ordering`]: dense position maintenance over block sequences.
//! - [`portfolio`]: the portfolio aggregate and its draft/published states.
//! - [`editor`]: the optimistic editor reducer.
//! - [`drag`]: drop-target resolution for the canvas.
//! - [`render`]: template render plans.
//! - [`ports`]: persistence and media collaborator traits.

pub mod block;
pub mod drag;
pub mod editor;
pub mod error;
pub mod ordering;
pub mod portfolio;
pub mod ports;
pub mod render;
pub mod types;
