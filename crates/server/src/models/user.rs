//! User model and password hashing.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};

/// User record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// PHC-format Argon2id hash (salt included).
    #[serde(skip_serializing, default)]
    pub pass: String,
    pub is_admin: bool,
}

/// Public projection used to pick a page author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

/// Input for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

/// A user ready to be persisted, with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub pass: String,
    pub is_admin: bool,
}

impl CreateUser {
    /// Hash the password and produce a storable record.
    pub fn hashed(self) -> Result<NewUser> {
        let email = self.email.trim().to_string();
        let username = self.username.trim().to_string();
        if email.is_empty() || username.is_empty() {
            anyhow::bail!("email and username must not be empty");
        }
        if self.password.is_empty() {
            anyhow::bail!("password must not be empty");
        }

        Ok(NewUser {
            email,
            username,
            pass: hash_password(&self.password)?,
            is_admin: self.is_admin,
        })
    }
}

impl User {
    /// Verify a password against this user's hash.
    ///
    /// Argon2 is deliberately slow; call this from a blocking task.
    pub fn verify_password(&self, password: &str) -> bool {
        if self.pass.is_empty() {
            return false;
        }

        let Ok(parsed_hash) = PasswordHash::new(&self.pass) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Projection for author pickers.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn user_with_password(password: &str) -> User {
        User {
            id: 1,
            email: "enrico@test.com".to_string(),
            username: "Enrico".to_string(),
            pass: hash_password(password).unwrap(),
            is_admin: false,
        }
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("test_password_123").unwrap();

        // Hash should start with Argon2 identifier
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn verify_accepts_right_password_only() {
        let user = user_with_password("password");
        assert!(user.verify_password("password"));
        assert!(!user.verify_password("wrong_password"));
    }

    #[test]
    fn verify_rejects_empty_or_garbled_hash() {
        let mut user = user_with_password("password");
        user.pass = String::new();
        assert!(!user.verify_password("password"));
        user.pass = "not-a-phc-string".to_string();
        assert!(!user.verify_password("password"));
    }

    #[test]
    fn serialized_user_never_contains_hash() {
        let user = user_with_password("password");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("pass").is_none());
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["username"], "Enrico");
    }

    #[test]
    fn create_user_rejects_blank_fields() {
        let input = CreateUser {
            email: "  ".to_string(),
            username: "x".to_string(),
            password: "pw".to_string(),
            is_admin: false,
        };
        assert!(input.hashed().is_err());
    }
}
