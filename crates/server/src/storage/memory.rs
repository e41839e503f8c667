//! In-memory implementation of ContentStorage.
//!
//! Every operation runs under a single `parking_lot::RwLock`, so a page write
//! is applied entirely or not at all, matching the transactional guarantees
//! of the PostgreSQL implementation.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use super::ContentStorage;
use crate::models::{
    Block, NewPage, NewUser, Page, PageSummary, User, UserSummary, page::listing_order,
    website::DEFAULT_WEBSITE_NAME,
};

#[derive(Debug, Clone)]
struct PageRecord {
    owner_user_id: i64,
    title: String,
    creation_date: NaiveDate,
    publication_date: Option<NaiveDate>,
}

#[derive(Debug)]
struct Data {
    users: BTreeMap<i64, User>,
    pages: BTreeMap<i64, PageRecord>,
    /// Blocks keyed by page ID, kept sorted by order.
    blocks: BTreeMap<i64, Vec<Block>>,
    website_name: String,
    next_user_id: i64,
    next_page_id: i64,
    next_block_id: i64,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            pages: BTreeMap::new(),
            blocks: BTreeMap::new(),
            website_name: DEFAULT_WEBSITE_NAME.to_string(),
            next_user_id: 1,
            next_page_id: 1,
            next_block_id: 1,
        }
    }
}

impl Data {
    fn author_of(&self, owner_user_id: i64) -> String {
        self.users
            .get(&owner_user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn summary(&self, id: i64, record: &PageRecord) -> PageSummary {
        PageSummary {
            id,
            owner_user_id: record.owner_user_id,
            author: self.author_of(record.owner_user_id),
            title: record.title.clone(),
            creation_date: record.creation_date,
            publication_date: record.publication_date,
        }
    }

    fn page(&self, id: i64) -> Option<Page> {
        let record = self.pages.get(&id)?;
        Some(Page {
            id,
            owner_user_id: record.owner_user_id,
            author: self.author_of(record.owner_user_id),
            title: record.title.clone(),
            creation_date: record.creation_date,
            publication_date: record.publication_date,
            blocks: self.blocks.get(&id).cloned().unwrap_or_default(),
        })
    }

    /// Mirror the schema constraints so both stores reject the same writes.
    fn check_constraints(&self, page: &NewPage) -> Result<()> {
        if !self.users.contains_key(&page.owner_user_id) {
            anyhow::bail!("owner {} does not exist", page.owner_user_id);
        }
        if page.title.trim().is_empty() {
            anyhow::bail!("page title must not be empty");
        }
        if page
            .publication_date
            .is_some_and(|d| d < page.creation_date)
        {
            anyhow::bail!("publication date precedes creation date");
        }

        let mut orders: Vec<i32> = page.blocks.iter().map(|b| b.order).collect();
        orders.sort_unstable();
        if orders.iter().any(|&o| o <= 0) || orders.windows(2).any(|w| w[0] == w[1]) {
            anyhow::bail!("block orders must be positive and unique");
        }
        if page.blocks.iter().any(|b| b.content.is_empty()) {
            anyhow::bail!("block content must not be empty");
        }

        Ok(())
    }

    fn write_blocks(&mut self, page_id: i64, page: &NewPage) {
        let mut blocks: Vec<Block> = page
            .blocks
            .iter()
            .map(|b| {
                let id = self.next_block_id;
                self.next_block_id += 1;
                Block {
                    id,
                    page_id,
                    block_type: b.block_type,
                    content: b.content.clone(),
                    order: b.order,
                }
            })
            .collect();
        blocks.sort_by_key(|b| b.order);
        self.blocks.insert(page_id, blocks);
    }
}

fn record_from(page: &NewPage) -> PageRecord {
    PageRecord {
        owner_user_id: page.owner_user_id,
        title: page.title.clone(),
        creation_date: page.creation_date,
        publication_date: page.publication_date,
    }
}

/// Content storage kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryContentStorage {
    data: RwLock<Data>,
}

impl MemoryContentStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks stored across all pages.
    pub fn block_count(&self) -> usize {
        self.data.read().blocks.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl ContentStorage for MemoryContentStorage {
    async fn find_user_by_login(&self, identifier: &str) -> Result<Option<User>> {
        let data = self.data.read();
        Ok(data
            .users
            .values()
            .find(|u| {
                u.email.eq_ignore_ascii_case(identifier)
                    || u.username.eq_ignore_ascii_case(identifier)
            })
            .cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.data.read().users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let mut users: Vec<UserSummary> =
            self.data.read().users.values().map(User::summary).collect();
        users.sort_by(|a, b| {
            a.username
                .to_lowercase()
                .cmp(&b.username.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(users)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut data = self.data.write();
        let taken = data.users.values().any(|u| {
            u.email.eq_ignore_ascii_case(&user.email)
                || u.username.eq_ignore_ascii_case(&user.username)
        });
        if taken {
            anyhow::bail!("a user with that email or username already exists");
        }

        let id = data.next_user_id;
        data.next_user_id += 1;
        let created = User {
            id,
            email: user.email.clone(),
            username: user.username.clone(),
            pass: user.pass.clone(),
            is_admin: user.is_admin,
        };
        data.users.insert(id, created.clone());
        Ok(created)
    }

    async fn list_pages(&self) -> Result<Vec<PageSummary>> {
        let data = self.data.read();
        let mut pages: Vec<PageSummary> = data
            .pages
            .iter()
            .map(|(&id, record)| data.summary(id, record))
            .collect();
        pages.sort_by(listing_order);
        Ok(pages)
    }

    async fn find_page(&self, id: i64) -> Result<Option<Page>> {
        Ok(self.data.read().page(id))
    }

    async fn insert_page(&self, page: &NewPage) -> Result<Page> {
        let mut data = self.data.write();
        data.check_constraints(page)?;

        let id = data.next_page_id;
        data.next_page_id += 1;
        data.pages.insert(id, record_from(page));
        data.write_blocks(id, page);

        data.page(id)
            .ok_or_else(|| anyhow::anyhow!("failed to fetch created page {id}"))
    }

    async fn replace_page(&self, id: i64, page: &NewPage) -> Result<Option<Page>> {
        let mut data = self.data.write();
        if !data.pages.contains_key(&id) {
            return Ok(None);
        }
        data.check_constraints(page)?;

        data.pages.insert(id, record_from(page));
        data.write_blocks(id, page);

        Ok(data.page(id))
    }

    async fn delete_page(&self, id: i64) -> Result<bool> {
        let mut data = self.data.write();
        data.blocks.remove(&id);
        Ok(data.pages.remove(&id).is_some())
    }

    async fn website_name(&self) -> Result<String> {
        Ok(self.data.read().website_name.clone())
    }

    async fn set_website_name(&self, name: &str) -> Result<()> {
        self.data.write().website_name = name.to_string();
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
