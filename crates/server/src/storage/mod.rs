//! Content storage abstraction.
//!
//! All reads and writes of users, pages, blocks, and website settings go
//! through [`ContentStorage`]. Services hold an `Arc<dyn ContentStorage>` and
//! never issue SQL themselves.
//!
//! Two implementations exist:
//!
//! - [`PgContentStorage`] executes SQL against PostgreSQL. Multi-step page
//!   writes run inside a single transaction.
//! - [`MemoryContentStorage`] keeps everything behind one lock. The test suite
//!   uses it to drive the real services and routes without a database.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::MemoryContentStorage;
pub use postgres::PgContentStorage;

use crate::models::{NewPage, NewUser, Page, PageSummary, User, UserSummary};

/// The storage trait for all persistent content.
///
/// Page writes are all-or-nothing: `insert_page` and `replace_page` either
/// persist the page row together with every block, or change nothing.
#[async_trait]
pub trait ContentStorage: Send + Sync {
    /// Find a user by email or username (case-insensitive).
    async fn find_user_by_login(&self, identifier: &str) -> Result<Option<User>>;

    /// Find a user by ID.
    async fn find_user(&self, id: i64) -> Result<Option<User>>;

    /// List all users as `{id, username}`, ordered by username.
    async fn list_users(&self) -> Result<Vec<UserSummary>>;

    /// Create a user.
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    /// List every page, ordered by publication date (undated last), then id.
    async fn list_pages(&self) -> Result<Vec<PageSummary>>;

    /// Load a page with its blocks sorted by order.
    async fn find_page(&self, id: i64) -> Result<Option<Page>>;

    /// Insert a page and all its blocks.
    async fn insert_page(&self, page: &NewPage) -> Result<Page>;

    /// Overwrite a page row and replace its whole block list.
    ///
    /// Returns `None` if the page does not exist.
    async fn replace_page(&self, id: i64, page: &NewPage) -> Result<Option<Page>>;

    /// Delete a page; its blocks go with it.
    ///
    /// Returns `true` if a page was deleted.
    async fn delete_page(&self, id: i64) -> Result<bool>;

    /// Current website name.
    async fn website_name(&self) -> Result<String>;

    /// Overwrite the website name.
    async fn set_website_name(&self, name: &str) -> Result<()>;

    /// Whether the backing store is reachable.
    async fn ping(&self) -> bool;

    /// Check if a user exists.
    async fn user_exists(&self, id: i64) -> Result<bool> {
        Ok(self.find_user(id).await?.is_some())
    }
}
