//! PostgreSQL implementation of ContentStorage.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use super::ContentStorage;
use crate::models::{
    Block, NewPage, NewUser, Page, PageSummary, User, UserSummary, website::DEFAULT_WEBSITE_NAME,
};

const PAGE_COLUMNS: &str = "p.id, p.owner_id, u.username AS author, p.title, p.creation_date, p.publication_date";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    pass: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            pass: row.pass,
            is_admin: row.is_admin,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PageRow {
    id: i64,
    owner_id: i64,
    author: String,
    title: String,
    creation_date: NaiveDate,
    publication_date: Option<NaiveDate>,
}

impl PageRow {
    fn into_summary(self) -> PageSummary {
        PageSummary {
            id: self.id,
            owner_user_id: self.owner_id,
            author: self.author,
            title: self.title,
            creation_date: self.creation_date,
            publication_date: self.publication_date,
        }
    }

    fn into_page(self, blocks: Vec<Block>) -> Page {
        Page {
            id: self.id,
            owner_user_id: self.owner_id,
            author: self.author,
            title: self.title,
            creation_date: self.creation_date,
            publication_date: self.publication_date,
            blocks,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BlockRow {
    id: i64,
    page_id: i64,
    block_type: String,
    content: String,
    block_order: i32,
}

impl TryFrom<BlockRow> for Block {
    type Error = anyhow::Error;

    fn try_from(row: BlockRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            page_id: row.page_id,
            block_type: row
                .block_type
                .parse()
                .with_context(|| format!("block {} has a corrupt type", row.id))?,
            content: row.content,
            order: row.block_order,
        })
    }
}

/// PostgreSQL-backed content storage.
#[derive(Clone)]
pub struct PgContentStorage {
    pool: PgPool,
}

impl PgContentStorage {
    /// Create a new storage with a database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_blocks(&self, page_id: i64) -> Result<Vec<Block>> {
        let rows = sqlx::query_as::<_, BlockRow>(
            "SELECT id, page_id, block_type, content, block_order FROM blocks WHERE page_id = $1 ORDER BY block_order",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch blocks")?;

        rows.into_iter().map(Block::try_from).collect()
    }

    async fn insert_blocks(
        tx: &mut Transaction<'_, Postgres>,
        page_id: i64,
        page: &NewPage,
    ) -> Result<()> {
        for block in &page.blocks {
            sqlx::query(
                "INSERT INTO blocks (page_id, block_type, content, block_order) VALUES ($1, $2, $3, $4)",
            )
            .bind(page_id)
            .bind(block.block_type.as_str())
            .bind(&block.content)
            .bind(block.order)
            .execute(&mut **tx)
            .await
            .with_context(|| format!("failed to insert block {} of page {page_id}", block.order))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ContentStorage for PgContentStorage {
    async fn find_user_by_login(&self, identifier: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, pass, is_admin FROM users WHERE LOWER(email) = LOWER($1) OR LOWER(username) = LOWER($1) ORDER BY id LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch user by login")?;

        Ok(row.map(User::from))
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, pass, is_admin FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch user by id")?;

        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, username FROM users ORDER BY LOWER(username), id")
                .fetch_all(&self.pool)
                .await
                .context("failed to list users")?;

        Ok(rows
            .into_iter()
            .map(|(id, username)| UserSummary { id, username })
            .collect())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, username, pass, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, username, pass, is_admin
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.pass)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .context("failed to create user")?;

        Ok(row.into())
    }

    async fn list_pages(&self) -> Result<Vec<PageSummary>> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages p JOIN users u ON u.id = p.owner_id ORDER BY p.publication_date ASC NULLS LAST, p.id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list pages")?;

        Ok(rows.into_iter().map(PageRow::into_summary).collect())
    }

    async fn find_page(&self, id: i64) -> Result<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages p JOIN users u ON u.id = p.owner_id WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch page by id")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let blocks = self.load_blocks(id).await?;
        Ok(Some(row.into_page(blocks)))
    }

    async fn insert_page(&self, page: &NewPage) -> Result<Page> {
        let mut tx = self.pool.begin().await.context("failed to start transaction")?;

        let page_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO pages (owner_id, title, creation_date, publication_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(page.owner_user_id)
        .bind(&page.title)
        .bind(page.creation_date)
        .bind(page.publication_date)
        .fetch_one(&mut *tx)
        .await
        .context("failed to insert page")?;

        Self::insert_blocks(&mut tx, page_id, page).await?;

        tx.commit().await.context("failed to commit transaction")?;

        self.find_page(page_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("failed to fetch created page {page_id}"))
    }

    async fn replace_page(&self, id: i64, page: &NewPage) -> Result<Option<Page>> {
        let mut tx = self.pool.begin().await.context("failed to start transaction")?;

        let updated = sqlx::query(
            r#"
            UPDATE pages SET
                owner_id = $1,
                title = $2,
                creation_date = $3,
                publication_date = $4
            WHERE id = $5
            "#,
        )
        .bind(page.owner_user_id)
        .bind(&page.title)
        .bind(page.creation_date)
        .bind(page.publication_date)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to update page")?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Ok(None);
        }

        sqlx::query("DELETE FROM blocks WHERE page_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("failed to delete old blocks")?;

        Self::insert_blocks(&mut tx, id, page).await?;

        tx.commit().await.context("failed to commit transaction")?;

        self.find_page(id).await
    }

    async fn delete_page(&self, id: i64) -> Result<bool> {
        // Blocks are deleted via CASCADE
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete page")?;

        Ok(result.rows_affected() > 0)
    }

    async fn website_name(&self) -> Result<String> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM website WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .context("failed to get website name")?;

        Ok(name.unwrap_or_else(|| DEFAULT_WEBSITE_NAME.to_string()))
    }

    async fn set_website_name(&self, name: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO website (id, name) VALUES (1, $1)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await
        .context("failed to set website name")?;

        Ok(())
    }

    async fn ping(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}
