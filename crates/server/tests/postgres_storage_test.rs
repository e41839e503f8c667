#![allow(clippy::unwrap_used, clippy::expect_used)]
//! PostgreSQL content storage tests.
//!
//! These run against the database named by `DATABASE_URL` (read from `.env`
//! like the server does) with migrations applied. Without it they return
//! early. Every test creates its own users and pages and only inspects rows
//! it created, so a shared database is fine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use cmsmall_server::db;
use cmsmall_server::models::{BlockType, NewBlock, NewPage, NewUser, User};
use cmsmall_server::storage::{ContentStorage, PgContentStorage};

static NEXT_USER: AtomicUsize = AtomicUsize::new(0);

async fn pg_storage() -> Option<(PgContentStorage, PgPool)> {
    dotenvy::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL storage test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");
    db::run_migrations(&pool)
        .await
        .expect("Failed to apply migrations");

    Some((PgContentStorage::new(pool.clone()), pool))
}

async fn new_user(storage: &PgContentStorage) -> User {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let name = format!(
        "pg-{}-{nanos}-{}",
        std::process::id(),
        NEXT_USER.fetch_add(1, Ordering::Relaxed)
    );

    storage
        .create_user(&NewUser {
            email: format!("{name}@test.com"),
            username: name,
            pass: String::new(),
            is_admin: false,
        })
        .await
        .expect("Failed to create user")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn block(block_type: BlockType, content: &str, order: i32) -> NewBlock {
    NewBlock {
        block_type,
        content: content.to_string(),
        order,
    }
}

fn new_page(owner_user_id: i64, title: &str, blocks: Vec<NewBlock>) -> NewPage {
    NewPage {
        owner_user_id,
        title: title.to_string(),
        creation_date: date("2024-01-01"),
        publication_date: Some(date("2024-01-02")),
        blocks,
    }
}

fn three_blocks() -> Vec<NewBlock> {
    vec![
        block(BlockType::Header, "Heading", 1),
        block(BlockType::Paragraph, "First", 2),
        block(BlockType::Paragraph, "Second", 3),
    ]
}

async fn block_count(pool: &PgPool, page_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM blocks WHERE page_id = $1")
        .bind(page_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn insert_then_find_returns_blocks_in_order() {
    let Some((storage, _)) = pg_storage().await else {
        return;
    };
    let owner = new_user(&storage).await;

    let created = storage
        .insert_page(&new_page(owner.id, "Ordered", three_blocks()))
        .await
        .unwrap();
    assert_eq!(created.author, owner.username);

    let found = storage.find_page(created.id).await.unwrap().unwrap();
    let blocks: Vec<(i32, &str)> = found
        .blocks
        .iter()
        .map(|b| (b.order, b.content.as_str()))
        .collect();
    assert_eq!(blocks, vec![(1, "Heading"), (2, "First"), (3, "Second")]);
    assert!(found.blocks.iter().all(|b| b.page_id == created.id));
    assert_eq!(found.blocks[0].block_type, BlockType::Header);
}

#[tokio::test]
async fn replace_with_fewer_blocks_leaves_exactly_those() {
    let Some((storage, pool)) = pg_storage().await else {
        return;
    };
    let owner = new_user(&storage).await;
    let page = storage
        .insert_page(&new_page(owner.id, "Before", three_blocks()))
        .await
        .unwrap();

    let replaced = storage
        .replace_page(
            page.id,
            &new_page(
                owner.id,
                "After",
                vec![
                    block(BlockType::Paragraph, "Intro", 1),
                    block(BlockType::Header, "Heading", 2),
                ],
            ),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(replaced.title, "After");
    let contents: Vec<&str> = replaced.blocks.iter().map(|b| b.content.as_str()).collect();
    assert_eq!(contents, vec!["Intro", "Heading"]);
    assert_eq!(block_count(&pool, page.id).await, 2);
}

#[tokio::test]
async fn failed_replace_keeps_previous_page_and_blocks() {
    let Some((storage, pool)) = pg_storage().await else {
        return;
    };
    let owner = new_user(&storage).await;
    let page = storage
        .insert_page(&new_page(owner.id, "Original", three_blocks()))
        .await
        .unwrap();

    // Two blocks share an order, so the second insert violates the unique key.
    let clashing = new_page(
        owner.id,
        "Clobbered",
        vec![
            block(BlockType::Header, "H", 1),
            block(BlockType::Paragraph, "P", 1),
        ],
    );
    assert!(storage.replace_page(page.id, &clashing).await.is_err());

    let after = storage.find_page(page.id).await.unwrap().unwrap();
    assert_eq!(after.title, "Original");
    assert_eq!(after.blocks, page.blocks);
    assert_eq!(block_count(&pool, page.id).await, 3);
}

#[tokio::test]
async fn replace_of_missing_page_changes_nothing() {
    let Some((storage, _)) = pg_storage().await else {
        return;
    };
    let owner = new_user(&storage).await;

    let result = storage
        .replace_page(i64::MAX, &new_page(owner.id, "Ghost", three_blocks()))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn delete_cascades_to_blocks() {
    let Some((storage, pool)) = pg_storage().await else {
        return;
    };
    let owner = new_user(&storage).await;
    let page = storage
        .insert_page(&new_page(owner.id, "Doomed", three_blocks()))
        .await
        .unwrap();
    assert_eq!(block_count(&pool, page.id).await, 3);

    assert!(storage.delete_page(page.id).await.unwrap());
    assert!(storage.find_page(page.id).await.unwrap().is_none());
    assert_eq!(block_count(&pool, page.id).await, 0);

    assert!(!storage.delete_page(page.id).await.unwrap());
}

#[tokio::test]
async fn listing_orders_by_publication_date_with_undated_last() {
    let Some((storage, _)) = pg_storage().await else {
        return;
    };
    let owner = new_user(&storage).await;

    let mut ids = Vec::new();
    for publication_date in [None, Some("2024-05-01"), Some("2024-03-01"), Some("2024-03-01")] {
        let page = NewPage {
            publication_date: publication_date.map(date),
            ..new_page(owner.id, "Listed", three_blocks())
        };
        ids.push(storage.insert_page(&page).await.unwrap().id);
    }

    let listed: Vec<i64> = storage
        .list_pages()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.owner_user_id == owner.id)
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, vec![ids[2], ids[3], ids[1], ids[0]]);
}
