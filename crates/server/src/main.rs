//! CMSmall server.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cmsmall_server::cli::{Cli, Command, cmd_create_user};
use cmsmall_server::config::Config;
use cmsmall_server::models::CreateUser;
use cmsmall_server::routes;
use cmsmall_server::session;
use cmsmall_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CreateUser {
            email,
            username,
            password,
            admin,
        } => {
            cmd_create_user(
                &config,
                CreateUser {
                    email,
                    username,
                    password,
                    is_admin: admin,
                },
            )
            .await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(port = config.port, "Starting CMSmall server");

    let redis = session::connect_redis(&config.redis_url)
        .await
        .context("failed to create session store")?;
    info!("Redis session store connected");

    let state = AppState::new(&config, redis.clone())
        .await
        .context("failed to initialize application state")?;

    let session_layer = session::create_session_layer(
        redis,
        session::parse_same_site(&config.cookie_same_site),
        config.cookie_secure,
    );

    let cors = build_cors_layer(&config);

    // Last added = first executed: TraceLayer → CORS → session → routes
    let app = routes::build_router(state, session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, images_dir = %config.images_dir.display(), "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        // Credentialed CORS cannot use a wildcard header list.
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
