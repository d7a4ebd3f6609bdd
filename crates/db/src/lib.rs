//! Request DTOs and reference adapters for the builder's collaborator ports.
//!
//! The adapters keep everything in process memory. They implement the
//! [`folio_core::ports`] traits with the same contracts a durable backend
//! must honour (atomic aggregate replacement, published-only slug lookup).

pub mod models;
pub mod repositories;

pub use repositories::{InMemoryMediaRepo, InMemoryPortfolioRepo};
