//! # Cart Configuration
//!
//! Configuration management for the cart store and its collaborators.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ROCKET_API_URL=http://localhost:3333                               │
//! │     ROCKET_STORAGE_KEY=@RocketShoes:cart                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/rocket-cart/cart.toml (Linux)                            │
//! │     ~/Library/Application Support/com.rocket.cart/cart.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     local API on port 3333, key "@RocketShoes:cart"                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [api]
//! base_url = "http://localhost:3333"
//! request_timeout_secs = 10  # optional, no client timeout when absent
//!
//! [storage]
//! key = "@RocketShoes:cart"
//! database_path = "/var/lib/rocket-cart/cart.db"  # optional
//! on_corrupt_state = "reset"  # reset | fail
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Corrupt State Policy
// =============================================================================

/// What `CartStore::init` does with a persisted cart it cannot decode.
///
/// ```text
/// RESET (Default)                     │  FAIL
/// ───────────────                     │  ────
/// • Log at WARN                       │  • init returns CorruptState
/// • Start with an empty cart          │  • Nothing is overwritten
/// • Next mutation overwrites the blob │
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptStatePolicy {
    /// Discard the unreadable blob and start empty.
    #[default]
    Reset,

    /// Refuse to start.
    Fail,
}

impl std::fmt::Display for CorruptStatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorruptStatePolicy::Reset => write!(f, "reset"),
            CorruptStatePolicy::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for CorruptStatePolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reset" | "discard" => Ok(CorruptStatePolicy::Reset),
            "fail" | "error" => Ok(CorruptStatePolicy::Fail),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown corrupt state policy: '{}'. Valid options: reset, fail",
                other
            ))),
        }
    }
}

// =============================================================================
// API Settings
// =============================================================================

/// Where the product catalog and stock endpoints live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL; `/stock/{id}` and `/products/{id}` are resolved against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds). No timeout when absent.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl ApiSettings {
    /// Returns the request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// How and where the cart is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key the cart blob is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// SQLite database file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Behavior when the persisted cart cannot be decoded.
    #[serde(default)]
    pub on_corrupt_state: CorruptStatePolicy,
}

fn default_storage_key() -> String {
    rocket_core::DEFAULT_CART_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_storage_key(),
            database_path: None,
            on_corrupt_state: CorruptStatePolicy::default(),
        }
    }
}

impl StorageSettings {
    /// Returns the configured database path, or the platform default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database_path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "rocket", "cart")
                .map(|dirs| dirs.data_dir().join("rocket-cart.db"))
        })
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Catalog and stock API.
    #[serde(default)]
    pub api: ApiSettings,

    /// Persistence.
    #[serde(default)]
    pub storage: StorageSettings,
}

impl CartConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(StoreError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.request_timeout_secs == Some(0) {
            return Err(StoreError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.storage.key.trim().is_empty() {
            return Err(StoreError::InvalidConfig("storage key must not be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ROCKET_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(secs) = lookup("ROCKET_API_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.api.request_timeout_secs = Some(s),
                Err(_) => warn!(value = %secs, "Ignoring non-numeric API timeout in environment"),
            }
        }

        if let Some(key) = lookup("ROCKET_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(path) = lookup("ROCKET_DB_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(policy) = lookup("ROCKET_ON_CORRUPT_STATE") {
            match policy.parse() {
                Ok(parsed) => self.storage.on_corrupt_state = parsed,
                Err(_) => warn!(policy = %policy, "Unknown corrupt state policy in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "rocket", "cart")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }
}
