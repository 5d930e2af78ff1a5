//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storefront: StorefrontConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8080".to_string(),
        "http://127.0.0.1:8080".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("bookstore"))
        .unwrap_or_else(|| PathBuf::from("./bookstore_data"))
}

fn default_db_path() -> String {
    data_dir().join("bookstore.db").to_string_lossy().to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

pub const DEFAULT_SECRET_KEY: &str = "change_me";

/// Token signing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    #[serde(default = "default_token_ttl")]
    pub access_token_expire_minutes: i64,
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_token_ttl() -> i64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            access_token_expire_minutes: default_token_ttl(),
        }
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// Static assets: the storefront bundle and uploaded covers
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_covers_dir")]
    pub covers_dir: String,

    #[serde(default = "default_max_cover_bytes")]
    pub max_cover_bytes: usize,
}

fn default_static_dir() -> String {
    "./bookstore-ui/dist".to_string()
}

fn default_covers_dir() -> String {
    data_dir().join("covers").to_string_lossy().to_string()
}

fn default_max_cover_bytes() -> usize {
    5 * 1024 * 1024 // 5 MiB
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
            covers_dir: default_covers_dir(),
            max_cover_bytes: default_max_cover_bytes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("bookstore").join("config.toml")),
            Some(PathBuf::from("/etc/bookstore/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the process env in production)
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = var("BOOKSTORE_HOST") {
            self.server.host = host;
        }
        if let Some(p) = var("BOOKSTORE_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = p;
        }
        if let Some(origins) = var("BOOKSTORE_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        // Database overrides; DATABASE_URL accepts a sqlite:// URL
        if let Some(url) = var("DATABASE_URL") {
            let path = url
                .strip_prefix("sqlite:///")
                .or_else(|| url.strip_prefix("sqlite://"))
                .unwrap_or(&url);
            self.database.path = path.to_string();
        }
        if let Some(path) = var("BOOKSTORE_DB_PATH") {
            self.database.path = path;
        }

        // Auth overrides
        if let Some(secret) = var("SECRET_KEY") {
            self.auth.secret_key = secret;
        }
        if let Some(secret) = var("BOOKSTORE_SECRET_KEY") {
            self.auth.secret_key = secret;
        }
        if let Some(ttl) = var("ACCESS_TOKEN_EXPIRE_MINUTES").and_then(|t| t.parse().ok()) {
            self.auth.access_token_expire_minutes = ttl;
        }

        // Storefront overrides
        if let Some(dir) = var("BOOKSTORE_STATIC_DIR") {
            self.storefront.static_dir = dir;
        }
        if let Some(dir) = var("BOOKSTORE_COVERS_DIR") {
            self.storefront.covers_dir = dir;
        }

        // Logging overrides
        if let Some(level) = var("BOOKSTORE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("BOOKSTORE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Bookstore Configuration
#
# Environment variables override these settings:
# - BOOKSTORE_HOST, BOOKSTORE_PORT, BOOKSTORE_CORS_ORIGINS
# - BOOKSTORE_DB_PATH (or DATABASE_URL=sqlite:///path/to/bookstore.db)
# - BOOKSTORE_SECRET_KEY (or SECRET_KEY), ACCESS_TOKEN_EXPIRE_MINUTES
# - BOOKSTORE_STATIC_DIR, BOOKSTORE_COVERS_DIR
# - BOOKSTORE_LOG_LEVEL, BOOKSTORE_LOG_FORMAT

[server]
# API server host
host = "0.0.0.0"

# API server port
port = 8000

# Allowed CORS origins ("*" allows any)
cors_origins = ["http://localhost:8080", "http://127.0.0.1:8080"]

# Request timeout in seconds
request_timeout_secs = 30

[database]
# SQLite database file
path = "~/.local/share/bookstore/bookstore.db"

[auth]
# Secret used to sign access tokens. Change this!
secret_key = "change_me"

# Access token lifetime (minutes)
access_token_expire_minutes = 60

[storefront]
# Built storefront bundle (trunk build output)
static_dir = "./bookstore-ui/dist"

# Where uploaded cover images are written
covers_dir = "~/.local/share/bookstore/covers"

# Maximum decoded cover size (bytes)
max_cover_bytes = 5242880

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.access_token_expire_minutes, 60);
        assert_eq!(config.storefront.max_cover_bytes, 5 * 1024 * 1024);
        assert!(config.auth.uses_default_secret());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[server\nport = ").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("BOOKSTORE_PORT", "9100"),
            ("DATABASE_URL", "sqlite:///tmp/shop.db"),
            ("SECRET_KEY", "from-secret-key"),
            ("BOOKSTORE_SECRET_KEY", "from-bookstore"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "15"),
            ("BOOKSTORE_CORS_ORIGINS", "http://a.test, ,http://b.test"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.path, "tmp/shop.db");
        assert_eq!(config.auth.secret_key, "from-bookstore");
        assert_eq!(config.auth.access_token_expire_minutes, 15);
        assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
