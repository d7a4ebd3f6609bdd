//! The authoritative mutation surface for portfolios.
//!
//! Every owner-scoped entry point loads the aggregate, checks ownership,
//! applies one change through the core engine and saves the whole aggregate
//! back. A missing portfolio and a portfolio owned by someone else are both
//! reported as `NotFound`, so non-owners learn nothing about existence.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use folio_core::block::{self, Block, BlockContent};
use folio_core::error::CoreError;
use folio_core::ordering;
use folio_core::portfolio::{Portfolio, PublishTransition};
use folio_core::ports::{MediaStore, PortfolioStore};
use folio_core::render::{self, RenderPlan};
use folio_core::types::{self, BlockId, PortfolioId};
use folio_db::models::block::NewBlock;
use folio_db::models::portfolio::{CreatePortfolio, PortfolioSummary, UpdatePortfolio};
use rand::Rng;

use crate::config::BuilderConfig;

type Generator = Box<dyn Fn() -> String + Send + Sync>;

/// Builder service over a portfolio store `S` and a media store `M`.
pub struct PortfolioBuilder<S, M> {
    store: S,
    media: M,
    config: BuilderConfig,
    mint_id: Generator,
    mint_slug: Generator,
}

impl<S: PortfolioStore, M: MediaStore> PortfolioBuilder<S, M> {
    pub fn new(store: S, media: M, config: BuilderConfig) -> Self {
        let slug_length = config.slug_length;
        Self {
            store,
            media,
            config,
            mint_id: Box::new(types::new_id),
            mint_slug: Box::new(move || generate_slug(slug_length)),
        }
    }

    /// Replace the portfolio and block id generator.
    pub fn with_id_generator(
        mut self,
        mint: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.mint_id = Box::new(mint);
        self
    }

    /// Replace the public slug generator.
    pub fn with_slug_generator(
        mut self,
        mint: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.mint_slug = Box::new(mint);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Portfolio lifecycle
    // -----------------------------------------------------------------------

    /// Create an empty draft portfolio for `owner_id`.
    pub async fn create_portfolio(
        &self,
        owner_id: &str,
        input: CreatePortfolio,
    ) -> Result<Portfolio, CoreError> {
        let id = self.mint_portfolio_id().await?;
        let portfolio = Portfolio::new(
            id,
            owner_id,
            input.title,
            input.template.unwrap_or(self.config.default_template),
            input
                .theme
                .unwrap_or_else(|| self.config.default_theme.clone()),
            Utc::now(),
        )?;
        self.store.save(&portfolio).await?;

        tracing::info!(
            portfolio_id = %portfolio.id,
            owner_id = %owner_id,
            template = portfolio.template.as_str(),
            "Portfolio created",
        );
        Ok(portfolio)
    }

    pub async fn get_portfolio(&self, id: &str, owner_id: &str) -> Result<Portfolio, CoreError> {
        self.load_owned(id, owner_id).await
    }

    /// Summaries of every portfolio owned by `owner_id`, most recently
    /// updated first.
    pub async fn list_portfolios(
        &self,
        owner_id: &str,
    ) -> Result<Vec<PortfolioSummary>, CoreError> {
        let mut portfolios = self.store.list_by_owner(owner_id).await?;
        portfolios.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(portfolios.iter().map(PortfolioSummary::from).collect())
    }

    /// Partial metadata update. Only provided fields change.
    ///
    /// A provided block list replaces the current one after every block has
    /// been validated. Any failure leaves the stored portfolio untouched.
    pub async fn update_metadata(
        &self,
        id: &str,
        owner_id: &str,
        input: UpdatePortfolio,
    ) -> Result<Portfolio, CoreError> {
        let mut portfolio = self.load_owned(id, owner_id).await?;
        if input.is_empty() {
            return Ok(portfolio);
        }

        let replaced_blocks = input.blocks.is_some();
        if let Some(title) = input.title {
            portfolio.set_title(title)?;
        }
        if let Some(template) = input.template {
            portfolio.template = template;
        }
        if let Some(theme) = input.theme {
            portfolio.theme = theme;
        }
        if let Some(blocks) = input.blocks {
            portfolio.replace_blocks(blocks)?;
        }

        let portfolio = self.persist(portfolio).await?;
        tracing::info!(
            portfolio_id = %portfolio.id,
            replaced_blocks,
            blocks = portfolio.blocks.len(),
            "Portfolio metadata updated",
        );
        Ok(portfolio)
    }

    /// Publish or unpublish. Repeating the current state is a no-op.
    ///
    /// A slug is minted only the first time a portfolio is published. After
    /// an unpublish the slug is held in reserve and restored on re-publish.
    pub async fn publish(
        &self,
        id: &str,
        owner_id: &str,
        should_publish: bool,
    ) -> Result<Portfolio, CoreError> {
        let mut portfolio = self.load_owned(id, owner_id).await?;

        let transition = if should_publish {
            let fresh = if portfolio.is_published() || portfolio.minted_slug().is_some() {
                None
            } else {
                Some(self.mint_public_slug(&portfolio.id).await?)
            };
            portfolio.publish(|| {
                fresh.ok_or_else(|| CoreError::Internal("public slug was not minted".to_string()))
            })?
        } else {
            portfolio.unpublish()
        };

        if transition == PublishTransition::Unchanged {
            tracing::debug!(portfolio_id = %id, should_publish, "Publish state unchanged");
            return Ok(portfolio);
        }

        let portfolio = self.persist(portfolio).await?;
        tracing::info!(
            portfolio_id = %portfolio.id,
            transition = ?transition,
            slug = portfolio.public_slug().unwrap_or(""),
            "Publish state changed",
        );
        Ok(portfolio)
    }

    /// Deep copy under a new id with fresh block ids. The copy is always a
    /// draft without a slug.
    pub async fn duplicate(&self, id: &str, owner_id: &str) -> Result<Portfolio, CoreError> {
        let source = self.load_owned(id, owner_id).await?;
        let new_id = self.mint_portfolio_id().await?;

        let mut minted: Vec<BlockId> = Vec::with_capacity(source.blocks.len());
        for _ in 0..source.blocks.len() {
            let block_id = self.mint_block_id(|candidate| {
                source.contains_block(candidate) || minted.iter().any(|m| m == candidate)
            })?;
            minted.push(block_id);
        }
        let mut fresh = minted.into_iter();
        let copy = source.duplicate_as(
            new_id,
            || fresh.next().unwrap_or_else(types::new_id),
            Utc::now(),
        );

        self.store.save(&copy).await?;
        tracing::info!(
            source_id = %source.id,
            portfolio_id = %copy.id,
            blocks = copy.blocks.len(),
            "Portfolio duplicated",
        );
        Ok(copy)
    }

    /// Delete the portfolio, then release the media references no other
    /// portfolio of the owner still holds (duplicates share references).
    ///
    /// Release is best-effort: failures are logged and never fail the delete.
    pub async fn delete_portfolio(&self, id: &str, owner_id: &str) -> Result<(), CoreError> {
        let portfolio = self.load_owned(id, owner_id).await?;
        if !self.store.delete(&portfolio.id).await? {
            return Err(CoreError::not_found("portfolio", id));
        }
        tracing::info!(portfolio_id = %id, owner_id = %owner_id, "Portfolio deleted");

        let still_held: HashSet<String> = match self.store.list_by_owner(owner_id).await {
            Ok(remaining) => remaining
                .iter()
                .filter(|other| other.id != portfolio.id)
                .flat_map(Portfolio::media_refs)
                .collect(),
            Err(e) => {
                tracing::warn!(
                    portfolio_id = %id,
                    error = %e,
                    "Could not check shared media, skipping release",
                );
                return Ok(());
            }
        };

        for media_ref in portfolio.media_refs() {
            if still_held.contains(&media_ref) {
                tracing::debug!(portfolio_id = %id, media_ref = %media_ref, "Media still in use");
                continue;
            }
            if let Err(e) = self.media.release(&media_ref).await {
                tracing::warn!(
                    portfolio_id = %id,
                    media_ref = %media_ref,
                    error = %e,
                    "Failed to release media reference",
                );
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Block edits
    // -----------------------------------------------------------------------

    /// Add a block built from the kind's defaults with `data` merged over
    /// them. An omitted position appends.
    pub async fn add_block(
        &self,
        id: &str,
        owner_id: &str,
        input: NewBlock,
    ) -> Result<Block, CoreError> {
        let mut portfolio = self.load_owned(id, owner_id).await?;

        let content = BlockContent::from_kind_and_data(&input.kind, input.data.as_ref())?;
        block::validate(&content).into_result()?;

        let block_id = self.mint_block_id(|candidate| portfolio.contains_block(candidate))?;
        let index = input.position.unwrap_or(portfolio.blocks.len());
        let block = Block::new(block_id.clone(), content);
        portfolio.blocks = ordering::insert_at(&portfolio.blocks, block, index);

        let portfolio = self.persist(portfolio).await?;
        let block = placed_block(&portfolio, &block_id)?;
        tracing::info!(
            portfolio_id = %portfolio.id,
            block_id = %block.id,
            kind = %block.kind(),
            position = block.position,
            "Block added",
        );
        Ok(block)
    }

    /// Shallow-merge `patch` into a block's payload and re-validate.
    pub async fn update_block(
        &self,
        id: &str,
        owner_id: &str,
        block_id: &str,
        patch: &serde_json::Value,
    ) -> Result<Block, CoreError> {
        let mut portfolio = self.load_owned(id, owner_id).await?;

        let existing = portfolio
            .block(block_id)
            .ok_or_else(|| CoreError::not_found("block", block_id))?;
        let content = existing.content.merged(patch)?;
        block::validate(&content).into_result()?;

        if let Some(target) = portfolio.blocks.iter_mut().find(|b| b.id == block_id) {
            target.content = content;
        }

        let portfolio = self.persist(portfolio).await?;
        let block = placed_block(&portfolio, block_id)?;
        tracing::info!(portfolio_id = %portfolio.id, block_id = %block_id, "Block updated");
        Ok(block)
    }

    /// Remove a block. An id that is not present changes nothing.
    pub async fn remove_block(
        &self,
        id: &str,
        owner_id: &str,
        block_id: &str,
    ) -> Result<Portfolio, CoreError> {
        let mut portfolio = self.load_owned(id, owner_id).await?;
        if !portfolio.contains_block(block_id) {
            tracing::debug!(
                portfolio_id = %id,
                block_id = %block_id,
                "Remove of unknown block ignored",
            );
            return Ok(portfolio);
        }

        portfolio.blocks = ordering::remove_by_id(&portfolio.blocks, block_id);
        let portfolio = self.persist(portfolio).await?;
        tracing::info!(portfolio_id = %portfolio.id, block_id = %block_id, "Block removed");
        Ok(portfolio)
    }

    /// Apply an explicit order. Unlisted blocks are dropped; unknown and
    /// repeated ids are ignored.
    pub async fn reorder_blocks<T: AsRef<str>>(
        &self,
        id: &str,
        owner_id: &str,
        block_ids: &[T],
    ) -> Result<Portfolio, CoreError> {
        let mut portfolio = self.load_owned(id, owner_id).await?;
        let before = portfolio.blocks.len();
        portfolio.blocks = ordering::reorder_by_explicit_sequence(&portfolio.blocks, block_ids);

        let portfolio = self.persist(portfolio).await?;
        tracing::info!(
            portfolio_id = %portfolio.id,
            blocks = portfolio.blocks.len(),
            dropped = before - portfolio.blocks.len(),
            "Blocks reordered",
        );
        Ok(portfolio)
    }

    // -----------------------------------------------------------------------
    // Public reads and rendering
    // -----------------------------------------------------------------------

    /// Look up a published portfolio by its public slug.
    pub async fn find_published(&self, slug: &str) -> Result<Portfolio, CoreError> {
        self.store
            .find_by_slug(slug)
            .await?
            .filter(Portfolio::is_published)
            .ok_or_else(|| CoreError::not_found("portfolio", slug))
    }

    /// Render plan of the owner's working copy, with media URLs resolved.
    pub async fn render_preview(&self, id: &str, owner_id: &str) -> Result<RenderPlan, CoreError> {
        let portfolio = self.load_owned(id, owner_id).await?;
        Ok(self.render(&portfolio).await)
    }

    /// Render plan of a published portfolio, with media URLs resolved.
    pub async fn render_published(&self, slug: &str) -> Result<RenderPlan, CoreError> {
        let portfolio = self.find_published(slug).await?;
        Ok(self.render(&portfolio).await)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn load_owned(&self, id: &str, owner_id: &str) -> Result<Portfolio, CoreError> {
        match self.store.find_by_id(id).await? {
            Some(portfolio) if portfolio.owner_id == owner_id => Ok(portfolio),
            _ => Err(CoreError::not_found("portfolio", id)),
        }
    }

    async fn persist(&self, mut portfolio: Portfolio) -> Result<Portfolio, CoreError> {
        portfolio.touch(Utc::now());
        self.store.save(&portfolio).await?;
        Ok(portfolio)
    }

    /// Unresolvable media keeps an empty URL; the page still renders.
    async fn render(&self, portfolio: &Portfolio) -> RenderPlan {
        let plan = render::render_plan(portfolio.template, &portfolio.blocks);

        let mut urls: HashMap<String, String> = HashMap::new();
        for media_ref in plan.media_refs() {
            match self.media.resolve_display_url(media_ref).await {
                Ok(url) => {
                    urls.insert(media_ref.to_string(), url);
                }
                Err(e) => tracing::warn!(
                    portfolio_id = %portfolio.id,
                    media_ref = %media_ref,
                    error = %e,
                    "Failed to resolve media URL",
                ),
            }
        }
        plan.with_media_urls(&urls)
    }

    async fn mint_portfolio_id(&self) -> Result<PortfolioId, CoreError> {
        for attempt in 1..=self.config.max_id_attempts {
            let candidate = (self.mint_id)();
            if self.store.find_by_id(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            tracing::warn!(attempt, "Portfolio id collision, retrying");
        }
        Err(CoreError::Conflict(format!(
            "could not mint a unique portfolio id after {} attempts",
            self.config.max_id_attempts
        )))
    }

    fn mint_block_id<F>(&self, taken: F) -> Result<BlockId, CoreError>
    where
        F: Fn(&str) -> bool,
    {
        for attempt in 1..=self.config.max_id_attempts {
            let candidate = (self.mint_id)();
            if !taken(&candidate) {
                return Ok(candidate);
            }
            tracing::warn!(attempt, "Block id collision, retrying");
        }
        Err(CoreError::Conflict(format!(
            "could not mint a unique block id after {} attempts",
            self.config.max_id_attempts
        )))
    }

    async fn mint_public_slug(&self, portfolio_id: &str) -> Result<String, CoreError> {
        for attempt in 1..=self.config.max_id_attempts {
            let candidate = (self.mint_slug)();
            if candidate != portfolio_id && !self.store.slug_in_use(&candidate).await? {
                return Ok(candidate);
            }
            tracing::warn!(portfolio_id = %portfolio_id, attempt, "Slug collision, retrying");
        }
        Err(CoreError::Conflict(format!(
            "could not mint a unique slug after {} attempts",
            self.config.max_id_attempts
        )))
    }
}

/// The block as stored after the engine placed it.
fn placed_block(portfolio: &Portfolio, block_id: &str) -> Result<Block, CoreError> {
    portfolio
        .block(block_id)
        .cloned()
        .ok_or_else(|| CoreError::Internal(format!("block {block_id} missing after save")))
}

/// Generate a lowercase alphanumeric public slug of `len` characters.
pub fn generate_slug(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
