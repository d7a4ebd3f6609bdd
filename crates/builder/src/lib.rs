//! Folio builder service.
//!
//! [`PortfolioBuilder`] is the authoritative mutation surface: it enforces
//! ownership, composes the core ordering engine and portfolio aggregate, and
//! persists through the [`folio_core::ports`] traits. [`BuilderConfig`]
//! carries the environment-driven settings.

pub mod config;
pub mod service;

pub use config::{BuilderConfig, ConfigError};
pub use service::PortfolioBuilder;
