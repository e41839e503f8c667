//! Website name setting.

use std::sync::Arc;

use tracing::info;

use super::policy::Actor;
use crate::error::{AppError, AppResult};
use crate::models::Website;
use crate::storage::ContentStorage;

/// Longest accepted website name, in characters.
const MAX_NAME_LEN: usize = 100;

#[derive(Clone)]
pub struct WebsiteService {
    storage: Arc<dyn ContentStorage>,
}

impl WebsiteService {
    pub fn new(storage: Arc<dyn ContentStorage>) -> Self {
        Self { storage }
    }

    pub async fn get(&self) -> AppResult<Website> {
        Ok(Website {
            name: self.storage.website_name().await?,
        })
    }

    /// Rename the website. Admin only.
    pub async fn set(&self, actor: &Actor, name: &str) -> AppResult<Website> {
        if !actor.is_admin {
            return Err(AppError::forbidden("Only an admin can rename the website"));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::invalid("name", "must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::invalid(
                "name",
                format!("must be at most {MAX_NAME_LEN} characters"),
            ));
        }

        self.storage.set_website_name(name).await?;
        info!(user_id = actor.id, name, "website renamed");

        Ok(Website {
            name: name.to_string(),
        })
    }
}
