//! Credential checks behind the session boundary.

use std::sync::LazyLock;

use anyhow::Context;

use crate::error::AppResult;
use crate::models::User;
use crate::models::user::hash_password;
use crate::storage::ContentStorage;

/// Verified in place of a real hash when the login matches nobody, so both
/// failures cost one Argon2 verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("cmsmall-unknown-user").unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to build dummy password hash");
        String::new()
    })
});

/// Look up a user by email or username and verify the password.
///
/// Unknown users and wrong passwords both yield `None`, after the same work.
pub async fn verify_credentials(
    storage: &dyn ContentStorage,
    identifier: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let identifier = identifier.trim();
    if identifier.is_empty() || password.is_empty() {
        return Ok(None);
    }

    let found = storage.find_user_by_login(identifier).await?;
    let known = found.is_some();
    let user = found.unwrap_or_else(placeholder_user);

    // Argon2 is CPU-bound; keep it off the async workers.
    let password = password.to_string();
    let (user, valid) = tokio::task::spawn_blocking(move || {
        let valid = user.verify_password(&password);
        (user, valid)
    })
    .await
    .context("password verification task failed")?;

    Ok((known && valid).then_some(user))
}

fn placeholder_user() -> User {
    User {
        id: 0,
        email: String::new(),
        username: String::new(),
        pass: DUMMY_HASH.clone(),
        is_admin: false,
    }
}

/// Load a user by id.
pub async fn get_user_by_id(storage: &dyn ContentStorage, id: i64) -> AppResult<Option<User>> {
    Ok(storage.find_user(id).await?)
}
