//! Page service.
//!
//! Takes the full desired state of a page (metadata plus the ordered block
//! list) and makes storage match it in one atomic write, or rejects it with
//! nothing changed. Updates replace every block of the page.

use std::sync::Arc;

use tracing::{debug, info};

use super::images::ImageLibrary;
use super::policy::{Actor, can_assign_owner, can_edit};
use super::validate::{ValidDraft, validate_draft};
use crate::error::{AppError, AppResult, FieldError};
use crate::models::{Page, PageDraft};
use crate::storage::ContentStorage;

/// Service for page writes.
#[derive(Clone)]
pub struct PageService {
    inner: Arc<PageServiceInner>,
}

struct PageServiceInner {
    storage: Arc<dyn ContentStorage>,
    images: ImageLibrary,
}

impl PageService {
    pub fn new(storage: Arc<dyn ContentStorage>, images: ImageLibrary) -> Self {
        Self {
            inner: Arc::new(PageServiceInner { storage, images }),
        }
    }

    /// Create a page with its blocks.
    ///
    /// The owner defaults to the actor. Naming anyone else requires admin.
    pub async fn create_page(&self, actor: &Actor, draft: &PageDraft) -> AppResult<Page> {
        let valid = validate_draft(draft).map_err(AppError::Validation)?;

        let owner_user_id = valid.owner_user_id.unwrap_or(actor.id);
        self.check_owner(actor, owner_user_id).await?;
        self.check_images(&valid).await?;

        let page = self
            .inner
            .storage
            .insert_page(&valid.into_new_page(owner_user_id))
            .await?;

        info!(
            page_id = page.id,
            user_id = actor.id,
            owner_user_id = page.owner_user_id,
            blocks = page.blocks.len(),
            "page created"
        );
        Ok(page)
    }

    /// Replace a page's metadata and its entire block list.
    pub async fn update_page(
        &self,
        actor: &Actor,
        page_id: i64,
        draft: &PageDraft,
    ) -> AppResult<Page> {
        let mut problems = Vec::new();
        if draft.id.is_some_and(|id| id != page_id) {
            problems.push(FieldError::new("id", "does not match the page being updated"));
        }
        let valid = match validate_draft(draft) {
            Ok(valid) if problems.is_empty() => valid,
            Ok(_) => return Err(AppError::Validation(problems)),
            Err(errors) => {
                problems.extend(errors);
                return Err(AppError::Validation(problems));
            }
        };

        let current = self
            .inner
            .storage
            .find_page(page_id)
            .await?
            .ok_or_else(|| AppError::not_found("Page not found"))?;

        if !can_edit(actor, current.owner_user_id) {
            debug!(page_id, user_id = actor.id, "update refused");
            return Err(AppError::forbidden("Only the author or an admin can edit this page"));
        }

        let owner_user_id = valid.owner_user_id.unwrap_or(current.owner_user_id);
        if owner_user_id != current.owner_user_id {
            self.check_owner(actor, owner_user_id).await?;
        }
        self.check_images(&valid).await?;

        let page = self
            .inner
            .storage
            .replace_page(page_id, &valid.into_new_page(owner_user_id))
            .await?
            // Deleted between the lookup and the write.
            .ok_or_else(|| AppError::not_found("Page not found"))?;

        info!(
            page_id,
            user_id = actor.id,
            owner_user_id,
            blocks = page.blocks.len(),
            "page updated"
        );
        Ok(page)
    }

    /// Delete a page and, with it, all of its blocks.
    pub async fn delete_page(&self, actor: &Actor, page_id: i64) -> AppResult<()> {
        let current = self
            .inner
            .storage
            .find_page(page_id)
            .await?
            .ok_or_else(|| AppError::not_found("Page not found"))?;

        if !can_edit(actor, current.owner_user_id) {
            debug!(page_id, user_id = actor.id, "delete refused");
            return Err(AppError::forbidden("Only the author or an admin can delete this page"));
        }

        if !self.inner.storage.delete_page(page_id).await? {
            return Err(AppError::not_found("Page not found"));
        }

        info!(page_id, user_id = actor.id, "page deleted");
        Ok(())
    }

    async fn check_owner(&self, actor: &Actor, owner_user_id: i64) -> AppResult<()> {
        if !can_assign_owner(actor, owner_user_id) {
            return Err(AppError::forbidden("Only an admin can assign a page to another user"));
        }
        if !self.inner.storage.user_exists(owner_user_id).await? {
            return Err(AppError::not_found("Owner not found"));
        }
        Ok(())
    }

    async fn check_images(&self, valid: &ValidDraft) -> AppResult<()> {
        let mut errors = Vec::new();
        for (index, name) in valid.image_names() {
            if !self.inner.images.contains(name).await {
                errors.push(FieldError::new(
                    format!("blocks[{index}].content"),
                    format!("unknown image '{name}'"),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}
