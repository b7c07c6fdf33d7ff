//! Application configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Uploaded media configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Page cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this site.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://` or `sqlite:`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Where uploaded post images live and how they are served.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory uploaded files are written to.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    /// URL prefix uploaded files are served under.
    #[serde(default = "default_media_url")]
    pub media_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            media_url: default_media_url(),
        }
    }
}

/// Page cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long a cached page stays fresh, in seconds. Zero disables caching.
    #[serde(default = "default_page_ttl_secs")]
    pub page_ttl_secs: u64,
    /// Most pages kept at once; the oldest go first.
    #[serde(default = "default_page_max_entries")]
    pub page_max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_ttl_secs: default_page_ttl_secs(),
            page_max_entries: default_page_max_entries(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    1
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

const fn default_page_ttl_secs() -> u64 {
    20
}

const fn default_page_max_entries() -> usize {
    300
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `YATUBE_ENV`)
    /// 3. Environment variables with `YATUBE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("YATUBE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
