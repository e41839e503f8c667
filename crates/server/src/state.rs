//! Application state shared across all handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use fred::prelude::Pool;
use tracing::info;

use crate::config::Config;
use crate::content::{ImageLibrary, PageService, QueryService, WebsiteService};
use crate::db;
use crate::session;
use crate::storage::{ContentStorage, PgContentStorage};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// All persistent content goes through this.
    storage: Arc<dyn ContentStorage>,

    /// Page writes.
    pages: PageService,

    /// Page, image, and user reads.
    queries: QueryService,

    website: WebsiteService,

    images: ImageLibrary,

    /// Session backend; `None` when sessions live in process memory.
    redis: Option<Pool>,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations, and wire up services.
    ///
    /// `redis` is the pool behind the session layer, probed by `/health`.
    pub async fn new(config: &Config, redis: Pool) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;
        info!("connected to PostgreSQL");

        db::run_migrations(&pool).await?;
        info!("database migrations applied");

        Ok(Self::build(
            Arc::new(PgContentStorage::new(pool)),
            config.images_dir.clone(),
            Some(redis),
        ))
    }

    /// Build state over an arbitrary storage backend.
    pub fn with_storage(storage: Arc<dyn ContentStorage>, images_dir: impl Into<PathBuf>) -> Self {
        Self::build(storage, images_dir, None)
    }

    fn build(
        storage: Arc<dyn ContentStorage>,
        images_dir: impl Into<PathBuf>,
        redis: Option<Pool>,
    ) -> Self {
        let images = ImageLibrary::new(images_dir);

        Self {
            inner: Arc::new(AppStateInner {
                pages: PageService::new(storage.clone(), images.clone()),
                queries: QueryService::new(storage.clone(), images.clone()),
                website: WebsiteService::new(storage.clone()),
                storage,
                images,
                redis,
            }),
        }
    }

    pub fn storage(&self) -> &dyn ContentStorage {
        self.inner.storage.as_ref()
    }

    pub fn pages(&self) -> &PageService {
        &self.inner.pages
    }

    pub fn queries(&self) -> &QueryService {
        &self.inner.queries
    }

    pub fn website(&self) -> &WebsiteService {
        &self.inner.website
    }

    pub fn images(&self) -> &ImageLibrary {
        &self.inner.images
    }

    /// Check if the session store is reachable.
    pub async fn sessions_healthy(&self) -> bool {
        match &self.inner.redis {
            Some(pool) => session::redis_healthy(pool).await,
            None => true,
        }
    }
}
