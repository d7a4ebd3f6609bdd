//! Request payloads accepted by the builder service.
//!
//! Create DTOs carry required fields; update DTOs are all-`Option` patches.

pub mod block;
pub mod portfolio;
