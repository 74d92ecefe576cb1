//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with POLLSITE_, sections split by `__`)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! The database URL and the session secret are read from `DATABASE_URL` and
//! `SECRET_KEY`, not from this file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Titles shown by the admin site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Header on every admin page
    pub site_header: String,
    /// Suffix of the HTML `<title>`
    pub site_title: String,
    /// Heading of the admin index page
    pub index_title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_header: "My Django Admin Ultimate Guide".to_string(),
            site_title: "My Django Admin Ultimate Guide Administration".to_string(),
            index_title: "Welcome to my \"sample_app\"".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Changelist behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Rows per changelist page unless the model admin overrides it
    pub list_per_page: u64,
    /// Maximum results returned by the autocomplete endpoint
    pub autocomplete_limit: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            list_per_page: 100,
            autocomplete_limit: 20,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. POLLSITE_ADMIN__LIST_PER_PAGE, POLLSITE_SERVER__BIND
            .add_source(
                Environment::with_prefix("POLLSITE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reload configuration from file
    pub fn reload() -> Result<(), ConfigError> {
        let new_config = Self::load()?;
        if let Ok(mut config) = APP_CONFIG.write() {
            *config = new_config;
            log::info!("Configuration reloaded");
        }
        Ok(())
    }
}

/// Triggers loading of the global configuration and logs the result.
pub fn init() {
    let config = get_config();
    log::info!(
        "Configuration loaded: site.site_header = {}, admin.list_per_page = {}",
        config.site.site_header,
        config.admin.list_per_page
    );
}

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

pub fn site() -> SiteConfig {
    get_config().site
}

pub fn server() -> ServerConfig {
    get_config().server
}

pub fn admin() -> AdminConfig {
    get_config().admin
}
