//! Bookstore Server
//!
//! Run with: cargo run --bin bookstore
//!
//! # Configuration
//!
//! A TOML file is read from `--config`, `BOOKSTORE_CONFIG` or the default
//! locations (`~/.config/bookstore/config.toml`, `/etc/bookstore/config.toml`,
//! `./config.toml`). Environment variables override file values:
//! - `BOOKSTORE_HOST` / `BOOKSTORE_PORT`: Bind address (default: 0.0.0.0:8000)
//! - `BOOKSTORE_DB_PATH` or `DATABASE_URL`: SQLite database
//! - `BOOKSTORE_SECRET_KEY` or `SECRET_KEY`: Token signing secret
//! - `ACCESS_TOKEN_EXPIRE_MINUTES`: Token lifetime (default: 60)
//! - `BOOKSTORE_STATIC_DIR`: Built storefront bundle
//! - `BOOKSTORE_COVERS_DIR`: Uploaded covers
//! - `RUST_LOG`: Log filter (overrides `BOOKSTORE_LOG_LEVEL`)

use bookstore::api::{serve, ApiConfig, AppState};
use bookstore::auth::TokenKeys;
use bookstore::config::{Config, LoggingConfig};
use bookstore::store::Store;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Online bookstore API and storefront server")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "BOOKSTORE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting Bookstore server v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_default_secret() {
        tracing::warn!("Using the default secret key; set BOOKSTORE_SECRET_KEY in production");
    }

    // Open database
    tracing::info!("Database: {}", config.database.path);
    let store = Store::open(&config.database.path)?;

    let tokens = TokenKeys::new(
        &config.auth.secret_key,
        config.auth.access_token_expire_minutes,
    );

    let api_config = ApiConfig::from(&config);
    tracing::info!("Storefront bundle: {:?}", api_config.static_dir);
    tracing::info!("Covers directory: {:?}", api_config.covers_dir);
    if !api_config.static_dir.join("index.html").exists() {
        tracing::warn!(
            "No index.html in {:?}; build bookstore-ui to serve the storefront",
            api_config.static_dir
        );
    }

    let state = AppState::new(store, tokens, api_config.clone());

    // Run server
    serve(state, &api_config).await?;

    tracing::info!("Bookstore server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bookstore={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
