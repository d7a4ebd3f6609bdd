//! In-memory adapters for the builder's collaborator ports.
//!
//! Each adapter guards its state with a `tokio::sync::RwLock` and can be
//! switched into a failing mode so callers' error paths can be exercised.

pub mod media_repo;
pub mod portfolio_repo;

pub use media_repo::InMemoryMediaRepo;
pub use portfolio_repo::InMemoryPortfolioRepo;
