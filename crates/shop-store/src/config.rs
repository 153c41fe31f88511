//! # Storefront Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Loading Order                          │
//! │                                                                         │
//! │  1. Defaults (PricingConfig::default, no remote, platform data dir)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. shop.toml (explicit path or ProjectDirs config dir)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Environment (SHOP_REMOTE_URL, SHOP_API_TOKEN, SHOP_DB_PATH,        │
//! │                  SHOP_TAX_RATE_BPS, SHOP_LOCAL_ZONE_MARKER)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. validate()                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # shop.toml
//! [pricing]
//! free_shipping_threshold = 300000   # minor units
//! local_zone_marker = "dhaka"
//! # or exact names: zone_classifier = "city_list"
//! #                 local_zone_cities = ["Dhaka", "Gazipur"]
//! tax_rate_bps = 800
//!
//! [remote]
//! base_url = "https://shop.example.com"
//! timeout_secs = 10
//!
//! [storage]
//! database_path = "/var/lib/shop/shop.db"
//! ```

use serde::{Deserialize, Serialize};
use shop_core::PricingConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Remote Settings
// =============================================================================

/// Where the remote cart/wishlist API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL, e.g. `https://shop.example.com`. Required for signed-in use.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            api_token: None,
        }
    }
}

impl RemoteSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file for guest buckets. Defaults to the platform data dir.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ShopConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shop.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading shop config from file");
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

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load shop config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Shop config saved");
        Ok(())
    }

    pub fn validate(&self) -> StoreResult<()> {
        self.pricing
            .validate()
            .map_err(|e| StoreError::InvalidConfig(format!("pricing: {}", e)))?;

        if let Some(ref url) = self.remote.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(StoreError::InvalidConfig(format!(
                    "remote.base_url must start with http:// or https://, got: {}",
                    url
                )));
            }
        }

        if self.remote.timeout_secs == 0 {
            return Err(StoreError::InvalidConfig(
                "remote.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SHOP_REMOTE_URL") {
            debug!(url = %url, "Overriding remote URL from environment");
            self.remote.base_url = Some(url);
        }

        if let Some(token) = lookup("SHOP_API_TOKEN") {
            self.remote.api_token = Some(token);
        }

        if let Some(path) = lookup("SHOP_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(bps) = lookup("SHOP_TAX_RATE_BPS") {
            match bps.parse::<u32>() {
                Ok(bps) => self.pricing.tax_rate_bps = bps,
                Err(_) => warn!(value = %bps, "Ignoring non-numeric SHOP_TAX_RATE_BPS"),
            }
        }

        if let Some(marker) = lookup("SHOP_LOCAL_ZONE_MARKER") {
            self.pricing.local_zone_marker = marker;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "shop")
            .map(|dirs| dirs.config_dir().join("shop.toml"))
    }

    /// Resolved database path: configured, else the platform data dir, else
    /// `./shop.db`.
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref path) = self.storage.database_path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "storefront", "shop")
            .map(|dirs| dirs.data_dir().join("shop.db"))
            .unwrap_or_else(|| PathBuf::from("shop.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = ShopConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.remote.timeout_secs, 10);
        assert!(config.remote.base_url.is_none());
    }

    #[test]
    fn test_validation() {
        let mut config = ShopConfig::default();
        config.remote.base_url = Some("ftp://shop".into());
        assert!(config.validate().is_err());

        config.remote.base_url = Some("https://shop.example.com".into());
        assert!(config.validate().is_ok());

        config.pricing.express_surcharge = config.pricing.priority_surcharge;
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SHOP_REMOTE_URL", "http://localhost:4000"),
            ("SHOP_DB_PATH", "/tmp/shop-test.db"),
            ("SHOP_TAX_RATE_BPS", "500"),
            ("SHOP_LOCAL_ZONE_MARKER", "chattogram"),
        ]
        .into_iter()
        .collect();

        let mut config = ShopConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.remote.base_url.as_deref(), Some("http://localhost:4000"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/shop-test.db"));
        assert_eq!(config.pricing.tax_rate_bps, 500);
        assert_eq!(config.pricing.local_zone_marker, "chattogram");
        assert!(config.remote.api_token.is_none());
    }

    #[test]
    fn test_bad_numeric_override_is_ignored() {
        let mut config = ShopConfig::default();
        config.apply_overrides(|name| (name == "SHOP_TAX_RATE_BPS").then(|| "eight".to_string()));
        assert_eq!(config.pricing.tax_rate_bps, 800);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.toml");
        std::fs::write(
            &path,
            r#"
[pricing]
tax_rate_bps = 750
express_surcharge = 6000
priority_surcharge = 12000

[remote]
base_url = "https://api.shop.test"
timeout_secs = 3
"#,
        )
        .unwrap();

        let config = ShopConfig::load(Some(path)).unwrap();
        assert_eq!(config.pricing.tax_rate_bps, 750);
        assert_eq!(config.pricing.local_zone_marker, "dhaka");
        assert_eq!(config.remote.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_city_list_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.toml");
        std::fs::write(
            &path,
            r#"
[pricing]
zone_classifier = "city_list"
local_zone_cities = ["Dhaka", "Gazipur"]
"#,
        )
        .unwrap();

        let config = ShopConfig::load(Some(path)).unwrap();
        assert_eq!(config.pricing.zone_classifier, shop_core::zone::ZoneClassifierKind::CityList);

        let engine = shop_core::PricingEngine::new(config.pricing);
        assert_eq!(engine.zone_for("Gazipur"), shop_core::Zone::Local);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shop.toml");

        let mut config = ShopConfig::default();
        config.remote.base_url = Some("https://api.shop.test".into());
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[pricing]"));
        assert!(contents.contains("[remote]"));
    }
}
