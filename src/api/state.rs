//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenKeys;
use crate::config::Config;
use crate::covers::CoverStore;
use crate::store::Store;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Bookstore database
    pub store: Store,
    /// Access token signing keys
    pub tokens: Arc<TokenKeys>,
    /// Uploaded cover storage
    pub covers: Arc<CoverStore>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Store, tokens: TokenKeys, config: ApiConfig) -> Self {
        let covers = CoverStore::new(config.covers_dir.clone(), config.max_cover_bytes);
        Self {
            store,
            tokens: Arc::new(tokens),
            covers: Arc::new(covers),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins; empty or "*" allows any
    pub cors_origins: Vec<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Built storefront bundle served for page routes
    pub static_dir: PathBuf,
    /// Directory for uploaded covers
    pub covers_dir: PathBuf,
    /// Maximum decoded cover size in bytes
    pub max_cover_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ApiConfig {
    fn from(config: &Config) -> Self {
        let max_cover_bytes = config.storefront.max_cover_bytes;
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            cors_origins: config.server.cors_origins.clone(),
            request_timeout_secs: config.server.request_timeout_secs,
            // base64 inflates by 4/3; leave headroom for the JSON envelope
            max_body_size: max_cover_bytes / 3 * 4 + 64 * 1024,
            static_dir: PathBuf::from(&config.storefront.static_dir),
            covers_dir: PathBuf::from(&config.storefront.covers_dir),
            max_cover_bytes,
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
