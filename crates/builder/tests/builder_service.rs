mod common;

use assert_matches::assert_matches;
use folio_builder::{BuilderConfig, PortfolioBuilder};
use folio_core::block::{Block, BlockContent, BlockKind};
use folio_core::editor::{EditorAction, EditorState};
use folio_core::error::CoreError;
use folio_core::ordering;
use folio_core::portfolio::TemplateKind;
use folio_core::ports::PortfolioStore;
use folio_core::render::Slot;
use folio_db::models::block::NewBlock;
use folio_db::models::portfolio::{CreatePortfolio, UpdatePortfolio};
use folio_db::{InMemoryMediaRepo, InMemoryPortfolioRepo};
use serde_json::json;

use common::{block_ids, create, test_builder, OTHER_OWNER, OWNER};

// -- Lifecycle scenario -------------------------------------------------------

#[tokio::test]
async fn insert_reorder_and_publish_round_trip() {
    let builder = test_builder();
    let portfolio = create(&builder, "My Work").await;
    assert!(portfolio.blocks.is_empty());
    assert!(!portfolio.is_published());

    let title = builder
        .add_block(&portfolio.id, OWNER, NewBlock::of_kind("title").at(0))
        .await
        .unwrap();
    let divider = builder
        .add_block(&portfolio.id, OWNER, NewBlock::of_kind("divider").at(0))
        .await
        .unwrap();

    let current = builder.get_portfolio(&portfolio.id, OWNER).await.unwrap();
    assert_eq!(block_ids(&current), vec![divider.id.clone(), title.id.clone()]);
    assert!(ordering::is_dense(&current.blocks));

    let current = builder
        .reorder_blocks(&portfolio.id, OWNER, &[title.id.as_str()])
        .await
        .unwrap();
    assert_eq!(block_ids(&current), vec![title.id.clone()]);
    assert_eq!(current.blocks[0].position, 0);

    let published = builder.publish(&portfolio.id, OWNER, true).await.unwrap();
    let slug = published.public_slug().unwrap().to_string();
    assert!(!slug.is_empty());

    let drafted = builder.publish(&portfolio.id, OWNER, false).await.unwrap();
    assert_eq!(drafted.public_slug(), None);
    assert_matches!(
        builder.find_published(&slug).await,
        Err(CoreError::NotFound { entity: "portfolio", .. })
    );

    let republished = builder.publish(&portfolio.id, OWNER, true).await.unwrap();
    assert_eq!(republished.public_slug(), Some(slug.as_str()));
    assert_eq!(builder.find_published(&slug).await.unwrap().id, portfolio.id);
}

#[tokio::test]
async fn publish_is_idempotent() {
    let builder = test_builder();
    let portfolio = create(&builder, "Idempotent").await;

    let draft = builder.publish(&portfolio.id, OWNER, false).await.unwrap();
    assert!(!draft.is_published());

    let first = builder.publish(&portfolio.id, OWNER, true).await.unwrap();
    let second = builder.publish(&portfolio.id, OWNER, true).await.unwrap();
    assert_eq!(first.public_slug(), second.public_slug());
    assert_eq!(first.updated_at, second.updated_at);
}

#[tokio::test]
async fn create_applies_configured_defaults() {
    let config = BuilderConfig {
        default_theme: "midnight".to_string(),
        default_template: TemplateKind::About,
        ..BuilderConfig::default()
    };
    let builder = PortfolioBuilder::new(
        InMemoryPortfolioRepo::new(),
        InMemoryMediaRepo::new(common::MEDIA_BASE_URL),
        config,
    );

    let portfolio = builder
        .create_portfolio(
            OWNER,
            CreatePortfolio {
                title: "Defaults".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(portfolio.theme, "midnight");
    assert_eq!(portfolio.template, TemplateKind::About);
}

#[tokio::test]
async fn create_rejects_blank_title() {
    let builder = test_builder();
    let result = builder
        .create_portfolio(
            OWNER,
            CreatePortfolio {
                title: "   ".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(CoreError::ValidationFailed { field, .. }) if field == "title");
    assert!(builder.store().is_empty().await);
}

// -- Ownership ----------------------------------------------------------------

#[tokio::test]
async fn foreign_and_missing_portfolios_are_not_found() {
    let builder = test_builder();
    let portfolio = create(&builder, "Private").await;

    assert_matches!(
        builder.get_portfolio(&portfolio.id, OTHER_OWNER).await,
        Err(CoreError::NotFound { entity: "portfolio", .. })
    );
    assert_matches!(
        builder
            .add_block(&portfolio.id, OTHER_OWNER, NewBlock::of_kind("title"))
            .await,
        Err(CoreError::NotFound { entity: "portfolio", .. })
    );
    assert_matches!(
        builder.delete_portfolio(&portfolio.id, OTHER_OWNER).await,
        Err(CoreError::NotFound { entity: "portfolio", .. })
    );
    assert_matches!(
        builder.publish("missing", OWNER, true).await,
        Err(CoreError::NotFound { entity: "portfolio", id }) if id == "missing"
    );

    // Still there for the real owner.
    assert!(builder.get_portfolio(&portfolio.id, OWNER).await.is_ok());
}

#[tokio::test]
async fn list_is_owner_scoped_and_most_recent_first() {
    let builder = test_builder();
    let older = create(&builder, "Older").await;
    let newer = create(&builder, "Newer").await;
    builder
        .create_portfolio(
            OTHER_OWNER,
            CreatePortfolio {
                title: "Someone else".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    builder
        .add_block(&older.id, OWNER, NewBlock::of_kind("divider"))
        .await
        .unwrap();

    let listed = builder.list_portfolios(OWNER).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![older.id.as_str(), newer.id.as_str()]);
    assert_eq!(listed[0].block_count, 1);
}

// -- Block validation -----------------------------------------------------------

#[tokio::test]
async fn add_block_rejects_invalid_payloads() {
    let builder = test_builder();
    let portfolio = create(&builder, "Gated").await;

    assert_matches!(
        builder
            .add_block(&portfolio.id, OWNER, NewBlock::of_kind("video"))
            .await,
        Err(CoreError::ValidationFailed { field, .. }) if field == "kind"
    );
    assert_matches!(
        builder
            .add_block(
                &portfolio.id,
                OWNER,
                NewBlock::of_kind("link").with_data(json!({"url": "javascript:alert(1)"})),
            )
            .await,
        Err(CoreError::ValidationFailed { .. })
    );
    assert_matches!(
        builder
            .add_block(
                &portfolio.id,
                OWNER,
                NewBlock::of_kind("divider").with_data(json!({"thickness": 42})),
            )
            .await,
        Err(CoreError::ValidationFailed { .. })
    );

    let current = builder.get_portfolio(&portfolio.id, OWNER).await.unwrap();
    assert!(current.blocks.is_empty());
}

#[tokio::test]
async fn every_kind_can_be_added_with_defaults() {
    let builder = test_builder();
    let portfolio = create(&builder, "All kinds").await;

    for kind in BlockKind::ALL {
        let block = builder
            .add_block(&portfolio.id, OWNER, NewBlock::of_kind(kind.as_str()))
            .await
            .unwrap();
        assert_eq!(block.kind(), kind);
    }

    let current = builder.get_portfolio(&portfolio.id, OWNER).await.unwrap();
    assert_eq!(current.blocks.len(), BlockKind::ALL.len());
    assert!(ordering::is_dense(&current.blocks));
}

#[tokio::test]
async fn add_block_sanitizes_rich_text() {
    let builder = test_builder();
    let portfolio = create(&builder, "Markup").await;

    let block = builder
        .add_block(
            &portfolio.id,
            OWNER,
            NewBlock::of_kind("richtext")
                .with_data(json!({"html": "<p onclick=\"x()\">Hi</p><script>steal()</script>"})),
        )
        .await
        .unwrap();
    let BlockContent::RichText(rich) = &block.content else {
        panic!("expected rich text, got {:?}", block.content);
    };
    assert!(!rich.html.contains("script"));
    assert!(!rich.html.contains("onclick"));
    assert!(rich.html.contains("Hi"));
}

#[tokio::test]
async fn update_block_merges_and_revalidates() {
    let builder = test_builder();
    let portfolio = create(&builder, "Updates").await;
    let title = builder
        .add_block(&portfolio.id, OWNER, NewBlock::of_kind("title"))
        .await
        .unwrap();

    let updated = builder
        .update_block(&portfolio.id, OWNER, &title.id, &json!({"text": "Hello", "level": 1}))
        .await
        .unwrap();
    let BlockContent::Title(heading) = &updated.content else {
        panic!("expected title, got {:?}", updated.content);
    };
    assert_eq!(heading.text, "Hello");
    assert_eq!(heading.level, 1);

    assert_matches!(
        builder
            .update_block(&portfolio.id, OWNER, &title.id, &json!({"text": ""}))
            .await,
        Err(CoreError::ValidationFailed { .. })
    );
    let stored = builder.get_portfolio(&portfolio.id, OWNER).await.unwrap();
    assert_eq!(stored.block(&title.id).unwrap().content, updated.content);

    assert_matches!(
        builder
            .update_block(&portfolio.id, OWNER, "nope", &json!({"text": "x"}))
            .await,
        Err(CoreError::NotFound { entity: "block", id }) if id == "nope"
    );
}

#[tokio::test]
async fn remove_block_keeps_positions_dense() {
    let builder = test_builder();
    let portfolio = create(&builder, "Removal").await;
    let mut ids = Vec::new();
    for kind in ["title", "list", "divider"] {
        ids.push(
            builder
                .add_block(&portfolio.id, OWNER, NewBlock::of_kind(kind))
                .await
                .unwrap()
                .id,
        );
    }

    let current = builder.remove_block(&portfolio.id, OWNER, &ids[1]).await.unwrap();
    assert_eq!(block_ids(&current), vec![ids[0].clone(), ids[2].clone()]);
    assert!(ordering::is_dense(&current.blocks));

    let unchanged = builder.remove_block(&portfolio.id, OWNER, "nope").await.unwrap();
    assert_eq!(unchanged.blocks, current.blocks);
}

// -- Bulk update ------------------------------------------------------------------

#[tokio::test]
async fn bulk_update_is_all_or_nothing() {
    let builder = test_builder();
    let portfolio = create(&builder, "Before").await;
    builder
        .add_block(&portfolio.id, OWNER, NewBlock::of_kind("title"))
        .await
        .unwrap();
    let before = builder.get_portfolio(&portfolio.id, OWNER).await.unwrap();

    let mut bad_link = Block::with_defaults("b2", BlockKind::Link);
    if let BlockContent::Link(link) = &mut bad_link.content {
        link.url = "not a url".to_string();
    }
    let result = builder
        .update_metadata(
            &portfolio.id,
            OWNER,
            UpdatePortfolio {
                title: Some("After".to_string()),
                blocks: Some(vec![Block::with_defaults("b1", BlockKind::Divider), bad_link]),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(
        result,
        Err(CoreError::ValidationFailed { field, .. }) if field.starts_with("blocks[1]")
    );

    let after = builder.get_portfolio(&portfolio.id, OWNER).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn bulk_update_normalizes_positions() {
    let builder = test_builder();
    let portfolio = create(&builder, "Bulk").await;

    let blocks = vec![
        Block {
            position: 9,
            ..Block::with_defaults("late", BlockKind::Divider)
        },
        Block {
            position: 2,
            ..Block::with_defaults("early", BlockKind::Title)
        },
    ];
    let saved = builder
        .update_metadata(
            &portfolio.id,
            OWNER,
            UpdatePortfolio {
                template: Some(TemplateKind::Contact),
                blocks: Some(blocks),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(block_ids(&saved), vec!["early", "late"]);
    assert!(ordering::is_dense(&saved.blocks));
    assert_eq!(saved.template, TemplateKind::Contact);
    assert_eq!(saved.title, "Bulk");
}

// -- Duplicate and delete -------------------------------------------------------

#[tokio::test]
async fn duplicate_is_unpublished_with_fresh_block_ids() {
    let builder = test_builder();
    let source = create(&builder, "Original").await;
    for kind in ["title", "images"] {
        builder
            .add_block(&source.id, OWNER, NewBlock::of_kind(kind))
            .await
            .unwrap();
    }
    let source = builder.publish(&source.id, OWNER, true).await.unwrap();

    let copy = builder.duplicate(&source.id, OWNER).await.unwrap();
    assert_ne!(copy.id, source.id);
    assert_eq!(copy.title, "Original (Copy)");
    assert!(!copy.is_published());
    assert_eq!(copy.minted_slug(), None);
    assert_eq!(copy.blocks.len(), source.blocks.len());
    for (copied, original) in copy.blocks.iter().zip(&source.blocks) {
        assert_ne!(copied.id, original.id);
        assert_eq!(copied.content, original.content);
        assert_eq!(copied.position, original.position);
    }

    // The source keeps its public address.
    assert_eq!(
        builder.find_published(source.public_slug().unwrap()).await.unwrap().id,
        source.id
    );
}

#[tokio::test]
async fn delete_releases_media() {
    let builder = test_builder();
    builder.media().register("m1").await;
    builder.media().register("m2").await;
    let portfolio = create(&builder, "Photos").await;
    builder
        .add_block(
            &portfolio.id,
            OWNER,
            NewBlock::of_kind("images").with_data(json!({"images": ["m1", "placeholder"]})),
        )
        .await
        .unwrap();
    builder
        .add_block(
            &portfolio.id,
            OWNER,
            NewBlock::of_kind("carousel").with_data(json!({"images": ["m2", "m1"]})),
        )
        .await
        .unwrap();

    builder.delete_portfolio(&portfolio.id, OWNER).await.unwrap();

    assert!(builder.store().is_empty().await);
    assert_eq!(builder.media().released().await, vec!["m1", "m2"]);
}

#[tokio::test]
async fn delete_succeeds_when_media_release_fails() {
    let builder = test_builder();
    builder.media().register("m1").await;
    let portfolio = create(&builder, "Photos").await;
    builder
        .add_block(
            &portfolio.id,
            OWNER,
            NewBlock::of_kind("images").with_data(json!({"images": ["m1"]})),
        )
        .await
        .unwrap();

    builder.media().set_failing(true);
    builder.delete_portfolio(&portfolio.id, OWNER).await.unwrap();

    assert!(builder.store().is_empty().await);
    assert!(builder.media().released().await.is_empty());
}

#[tokio::test]
async fn delete_keeps_media_shared_with_a_duplicate() {
    let builder = test_builder();
    builder.media().register("m1").await;
    builder.media().register("m2").await;
    let source = create(&builder, "Photos").await;
    builder
        .add_block(
            &source.id,
            OWNER,
            NewBlock::of_kind("images").with_data(json!({"images": ["m1"]})),
        )
        .await
        .unwrap();
    let copy = builder.duplicate(&source.id, OWNER).await.unwrap();
    builder
        .add_block(
            &source.id,
            OWNER,
            NewBlock::of_kind("carousel").with_data(json!({"images": ["m2"]})),
        )
        .await
        .unwrap();

    builder.delete_portfolio(&source.id, OWNER).await.unwrap();

    // Only the reference the copy does not hold is given back.
    assert_eq!(builder.media().released().await, vec!["m2"]);
    let plan = builder.render_preview(&copy.id, OWNER).await.unwrap();
    assert_eq!(
        plan.items[0].media[0].url.as_deref(),
        Some("https://media.test/m1")
    );
}

// -- Identity minting -------------------------------------------------------------

#[tokio::test]
async fn portfolio_id_collisions_exhaust_into_conflict() {
    let builder = test_builder().with_id_generator(|| "fixed-id".to_string());
    create(&builder, "First").await;

    let result = builder
        .create_portfolio(
            OWNER,
            CreatePortfolio {
                title: "Second".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(CoreError::Conflict(_)));
    assert_eq!(builder.store().len().await, 1);
}

#[tokio::test]
async fn slug_collisions_exhaust_into_conflict() {
    let builder = test_builder().with_slug_generator(|| "takenslug1".to_string());
    let first = create(&builder, "First").await;
    let second = create(&builder, "Second").await;

    let published = builder.publish(&first.id, OWNER, true).await.unwrap();
    assert_eq!(published.public_slug(), Some("takenslug1"));

    assert_matches!(
        builder.publish(&second.id, OWNER, true).await,
        Err(CoreError::Conflict(_))
    );
    let second = builder.get_portfolio(&second.id, OWNER).await.unwrap();
    assert!(!second.is_published());
}

#[tokio::test]
async fn reserved_slugs_are_not_reminted() {
    let builder = test_builder().with_slug_generator(|| "reserved01".to_string());
    let first = create(&builder, "First").await;
    let second = create(&builder, "Second").await;

    builder.publish(&first.id, OWNER, true).await.unwrap();
    builder.publish(&first.id, OWNER, false).await.unwrap();

    // Unpublished, but the slug is still held for re-publish.
    assert!(builder.store().slug_in_use("reserved01").await.unwrap());
    assert_matches!(
        builder.publish(&second.id, OWNER, true).await,
        Err(CoreError::Conflict(_))
    );
}

// -- Rendering --------------------------------------------------------------------

#[tokio::test]
async fn render_published_resolves_media() {
    let builder = test_builder();
    builder.media().register("m1").await;
    let portfolio = create(&builder, "Gallery").await;
    builder
        .add_block(
            &portfolio.id,
            OWNER,
            NewBlock::of_kind("images").with_data(json!({"images": ["m1", "gone", "placeholder"]})),
        )
        .await
        .unwrap();
    let published = builder.publish(&portfolio.id, OWNER, true).await.unwrap();

    let plan = builder
        .render_published(published.public_slug().unwrap())
        .await
        .unwrap();
    assert_eq!(plan.template, TemplateKind::Gallery);
    let item = &plan.items[0];
    assert_eq!(item.slot, Slot::FullBleed);
    assert_eq!(item.media[0].url.as_deref(), Some("https://media.test/m1"));
    assert_eq!(item.media[1].url, None);
    assert!(item.media[2].placeholder);
}

#[tokio::test]
async fn render_preview_works_for_drafts_only_for_owner() {
    let builder = test_builder();
    let portfolio = create(&builder, "Draft").await;
    builder
        .add_block(&portfolio.id, OWNER, NewBlock::of_kind("link"))
        .await
        .unwrap();
    builder
        .update_metadata(
            &portfolio.id,
            OWNER,
            UpdatePortfolio {
                template: Some(TemplateKind::Contact),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let plan = builder.render_preview(&portfolio.id, OWNER).await.unwrap();
    assert_eq!(plan.items[0].slot, Slot::CallToAction);

    assert_matches!(
        builder.render_preview(&portfolio.id, OTHER_OWNER).await,
        Err(CoreError::NotFound { .. })
    );
}

// -- Store failures ---------------------------------------------------------------

#[tokio::test]
async fn store_failures_surface_as_internal() {
    let builder = test_builder();
    let portfolio = create(&builder, "Flaky").await;

    builder.store().set_unavailable(true);
    assert_matches!(
        builder
            .add_block(&portfolio.id, OWNER, NewBlock::of_kind("title"))
            .await,
        Err(CoreError::Internal(_))
    );
}

// -- Reducer parity ---------------------------------------------------------------

#[tokio::test]
async fn reducer_matches_service_for_the_same_edits() {
    let builder = test_builder();
    let portfolio = create(&builder, "Parity").await;
    let mut editor = EditorState::new(portfolio.clone());

    let title = builder
        .add_block(&portfolio.id, OWNER, NewBlock::of_kind("title").at(0))
        .await
        .unwrap();
    editor.apply(EditorAction::AddBlock {
        block: Block::new(title.id.clone(), title.content.clone()),
        position: Some(0),
    });

    let divider = builder
        .add_block(&portfolio.id, OWNER, NewBlock::of_kind("divider").at(0))
        .await
        .unwrap();
    editor.apply(EditorAction::AddBlock {
        block: Block::new(divider.id.clone(), divider.content.clone()),
        position: Some(0),
    });

    let list = builder
        .add_block(&portfolio.id, OWNER, NewBlock::of_kind("list").at(1))
        .await
        .unwrap();
    editor.apply(EditorAction::AddBlock {
        block: Block::new(list.id.clone(), list.content.clone()),
        position: Some(1),
    });

    let patch = json!({"items": ["One", "Two"]});
    builder
        .update_block(&portfolio.id, OWNER, &list.id, &patch)
        .await
        .unwrap();
    editor.apply(EditorAction::UpdateBlock {
        block_id: list.id.clone(),
        patch,
    });

    let order = vec![list.id.clone(), title.id.clone()];
    let server = builder
        .reorder_blocks(&portfolio.id, OWNER, &order)
        .await
        .unwrap();
    editor.apply(EditorAction::ReorderBlocks { block_ids: order });

    assert_eq!(editor.blocks(), server.blocks.as_slice());
    assert!(editor.is_dirty);

    editor.apply(EditorAction::Load(server.clone()));
    assert!(!editor.is_dirty);
    assert_eq!(editor.portfolio, server);
}
