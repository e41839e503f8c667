//! Read-side queries: page listings, single pages, images, and authors.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use super::images::ImageLibrary;
use super::policy::{Actor, can_view};
use crate::error::{AppError, AppResult};
use crate::models::{Page, PageSummary, UserSummary};
use crate::storage::ContentStorage;

/// Which side of the site a read is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Public site: published pages only.
    FrontOffice,
    /// Management area: every page.
    BackOffice,
}

impl View {
    /// Logged-in callers get the back office unless they ask for the public view.
    pub fn resolve(actor: Option<&Actor>, public_requested: bool) -> Self {
        match actor {
            Some(_) if !public_requested => Self::BackOffice,
            _ => Self::FrontOffice,
        }
    }
}

/// `?public` query flag. Present with any value (or none) selects the front office.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub public: Option<String>,
}

impl ViewQuery {
    pub fn public_requested(&self) -> bool {
        match self.public.as_deref() {
            None => false,
            Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"),
        }
    }
}

/// Service for reads.
#[derive(Clone)]
pub struct QueryService {
    storage: Arc<dyn ContentStorage>,
    images: ImageLibrary,
}

impl QueryService {
    pub fn new(storage: Arc<dyn ContentStorage>, images: ImageLibrary) -> Self {
        Self { storage, images }
    }

    /// List pages for a view. The front office only sees published pages.
    pub async fn list_pages(
        &self,
        actor: Option<&Actor>,
        view: View,
        today: NaiveDate,
    ) -> AppResult<Vec<PageSummary>> {
        let pages = self.storage.list_pages().await?;

        let pages = match (view, actor) {
            (View::BackOffice, Some(_)) => pages,
            _ => pages
                .into_iter()
                .filter(|p| p.is_published(today))
                .collect(),
        };
        Ok(pages)
    }

    /// Load one page with its blocks.
    pub async fn get_page(
        &self,
        actor: Option<&Actor>,
        view: View,
        page_id: i64,
        today: NaiveDate,
    ) -> AppResult<Page> {
        let page = self
            .storage
            .find_page(page_id)
            .await?
            .ok_or_else(|| AppError::not_found("Page not found"))?;

        if view == View::BackOffice && actor.is_some() {
            return Ok(page);
        }
        if !can_view(actor, &page, today) {
            return Err(AppError::forbidden("This page is not published"));
        }
        Ok(page)
    }

    /// Names of every image in the library.
    pub async fn list_images(&self) -> AppResult<Vec<String>> {
        Ok(self.images.list().await?)
    }

    /// Authors a page can be assigned to. Admin only.
    pub async fn list_users(&self, actor: &Actor) -> AppResult<Vec<UserSummary>> {
        if !actor.is_admin {
            return Err(AppError::forbidden("Only an admin can list users"));
        }
        Ok(self.storage.list_users().await?)
    }
}
