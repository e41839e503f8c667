//! Command-line interface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::models::CreateUser;
use crate::storage::{ContentStorage, PgContentStorage};

#[derive(Parser, Debug)]
#[command(author, version, about = "CMSmall content management server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve,

    /// Create a user account directly in the database
    CreateUser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
    },
}

/// Create a user from the command line.
pub async fn cmd_create_user(config: &Config, input: CreateUser) -> Result<()> {
    let pool = db::create_pool(config).await?;
    db::run_migrations(&pool).await?;
    let storage = PgContentStorage::new(pool);

    if storage.find_user_by_login(&input.email).await?.is_some()
        || storage.find_user_by_login(&input.username).await?.is_some()
    {
        anyhow::bail!("a user with that email or username already exists");
    }

    let user = storage
        .create_user(&input.hashed()?)
        .await
        .context("failed to create user")?;

    info!(user_id = user.id, username = %user.username, is_admin = user.is_admin, "user created");
    println!("Created user {} (id {})", user.username, user.id);
    Ok(())
}
