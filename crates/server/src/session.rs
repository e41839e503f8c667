//! Session management using Redis.

use anyhow::{Context, Result};
use fred::prelude::*;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_redis_store::RedisStore;

/// Default session expiry (24 hours).
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;

/// Connect the Redis pool that backs sessions.
pub async fn connect_redis(redis_url: &str) -> Result<Pool> {
    let config = Config::from_url(redis_url).context("failed to parse Redis URL")?;

    let pool = Builder::from_config(config)
        .build_pool(1)
        .context("failed to create Redis pool")?;

    pool.init()
        .await
        .context("failed to connect to Redis for sessions")?;

    Ok(pool)
}

/// Create the session layer using Redis as the backend.
pub fn create_session_layer(
    pool: Pool,
    same_site: SameSite,
    secure: bool,
) -> SessionManagerLayer<RedisStore<Pool>> {
    configure_session_layer(RedisStore::new(pool), same_site, secure)
}

/// Whether the session Redis answers PING.
pub async fn redis_healthy(pool: &Pool) -> bool {
    pool.ping::<String>(None).await.is_ok()
}

/// Apply the cookie policy to a session store.
pub fn configure_session_layer<S>(store: S, same_site: SameSite, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_secure(secure)
        .with_http_only(true)
        .with_same_site(same_site)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            DEFAULT_SESSION_EXPIRY_HOURS,
        )))
}

/// Parse a SameSite policy name. Unknown values fall back to `Lax`.
pub fn parse_same_site(value: &str) -> SameSite {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        "lax" => SameSite::Lax,
        other => {
            tracing::warn!(value = other, "unknown COOKIE_SAME_SITE, using lax");
            SameSite::Lax
        }
    }
}
