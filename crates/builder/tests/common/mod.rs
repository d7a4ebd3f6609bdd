#![allow(dead_code)]

use std::sync::Once;

use folio_builder::{BuilderConfig, PortfolioBuilder};
use folio_core::portfolio::Portfolio;
use folio_db::models::portfolio::CreatePortfolio;
use folio_db::{InMemoryMediaRepo, InMemoryPortfolioRepo};

pub type TestBuilder = PortfolioBuilder<InMemoryPortfolioRepo, InMemoryMediaRepo>;

pub const OWNER: &str = "owner-1";
pub const OTHER_OWNER: &str = "owner-2";
pub const MEDIA_BASE_URL: &str = "https://media.test";

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary. Honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "folio_builder=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A builder over fresh in-memory adapters with default configuration.
pub fn test_builder() -> TestBuilder {
    init_tracing();
    PortfolioBuilder::new(
        InMemoryPortfolioRepo::new(),
        InMemoryMediaRepo::new(MEDIA_BASE_URL),
        BuilderConfig::default(),
    )
}

/// Create a draft portfolio titled `title` for [`OWNER`].
pub async fn create(builder: &TestBuilder, title: &str) -> Portfolio {
    builder
        .create_portfolio(
            OWNER,
            CreatePortfolio {
                title: title.to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("create portfolio")
}

/// Ids of the portfolio's blocks in position order.
pub fn block_ids(portfolio: &Portfolio) -> Vec<String> {
    portfolio.blocks.iter().map(|b| b.id.clone()).collect()
}
