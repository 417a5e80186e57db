//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/civicmap/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::store::DocumentStore;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Clustering, duplicate and query tunables
    #[serde(default)]
    pub engine: EngineConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Engine tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Clustering proximity radius in kilometers
    #[serde(default = "default_cluster_radius_km")]
    pub cluster_radius_km: f64,

    /// Radius in kilometers within which a repeated category is a duplicate
    #[serde(default = "default_duplicate_radius_km")]
    pub duplicate_radius_km: f64,

    /// Age window for viewport queries, in days
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Maximum rows per viewport query
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,

    /// Viewport change debounce interval in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Document store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Submissions file; empty means the XDG data directory default
    #[serde(default)]
    pub path: String,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_cluster_radius_km() -> f64 {
    DEFAULT_CLUSTER_RADIUS_KM
}
fn default_duplicate_radius_km() -> f64 {
    DEFAULT_DUPLICATE_RADIUS_KM
}
fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}
fn default_result_cap() -> usize {
    DEFAULT_RESULT_CAP
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},18z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=18/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster_radius_km: default_cluster_radius_km(),
            duplicate_radius_km: default_duplicate_radius_km(),
            retention_days: default_retention_days(),
            result_cap: default_result_cap(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl EngineConfig {
    /// Debounce interval as a duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Retention window as a duration
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }

    /// Check that the tunables make sense together
    pub fn validate(&self) -> Result<()> {
        if !(self.cluster_radius_km >= 0.0) {
            return Err(Error::Config(format!(
                "cluster_radius_km must be non-negative, got {}",
                self.cluster_radius_km
            )));
        }
        if !(self.duplicate_radius_km >= 0.0) {
            return Err(Error::Config(format!(
                "duplicate_radius_km must be non-negative, got {}",
                self.duplicate_radius_km
            )));
        }
        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(Error::Config(format!(
                "retention_days must be at most {}, got {}",
                MAX_RETENTION_DAYS, self.retention_days
            )));
        }
        if self.result_cap == 0 {
            return Err(Error::Config("result_cap must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            let config: Config = toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })?;
            config.engine.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Resolved submissions file path
    pub fn store_path(&self) -> Result<PathBuf> {
        if self.store.path.is_empty() {
            DocumentStore::default_path()
        } else {
            Ok(PathBuf::from(&self.store.path))
        }
    }

    /// Open the configured document store
    pub fn open_store(&self) -> Result<DocumentStore> {
        DocumentStore::open(self.store_path()?)
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["engine", "cluster_radius_km"] => Some(self.engine.cluster_radius_km.to_string()),
            ["engine", "duplicate_radius_km"] => {
                Some(self.engine.duplicate_radius_km.to_string())
            }
            ["engine", "retention_days"] => Some(self.engine.retention_days.to_string()),
            ["engine", "result_cap"] => Some(self.engine.result_cap.to_string()),
            ["engine", "debounce_ms"] => Some(self.engine.debounce_ms.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["store", "path"] => Some(self.store.path.clone()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        let invalid = |what: &str| Error::Config(format!("Invalid {} value: {}", what, value));
        let mut engine = self.engine.clone();

        match parts.as_slice() {
            ["engine", "cluster_radius_km"] => {
                engine.cluster_radius_km = value.parse().map_err(|_| invalid("radius"))?;
            }
            ["engine", "duplicate_radius_km"] => {
                engine.duplicate_radius_km = value.parse().map_err(|_| invalid("radius"))?;
            }
            ["engine", "retention_days"] => {
                engine.retention_days = value.parse().map_err(|_| invalid("days"))?;
            }
            ["engine", "result_cap"] => {
                engine.result_cap = value.parse().map_err(|_| invalid("cap"))?;
            }
            ["engine", "debounce_ms"] => {
                engine.debounce_ms = value.parse().map_err(|_| invalid("interval"))?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| invalid("port"))?;
            }

            ["store", "path"] => {
                self.store.path = value.to_string();
            }

            ["url", "default"] => {
                if !self.url.providers.contains_key(value) {
                    return Err(Error::Config(format!("Unknown URL provider: {}", value)));
                }
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        engine.validate()?;
        self.engine = engine;
        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "engine.cluster_radius_km",
            "engine.duplicate_radius_km",
            "engine.retention_days",
            "engine.result_cap",
            "engine.debounce_ms",
            "server.host",
            "server.port",
            "store.path",
            "url.default",
        ]
    }

    /// Format a URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.engine.cluster_radius_km, 0.05);
        assert_eq!(config.engine.duplicate_radius_km, 0.1);
        assert_eq!(config.engine.retention_days, 90);
        assert_eq!(config.engine.result_cap, 5000);
        assert_eq!(config.engine.debounce(), Duration::from_millis(600));
        assert_eq!(config.server.port, 7878);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        config.set("engine.cluster_radius_km", "0.2").unwrap();
        assert_eq!(config.get("engine.cluster_radius_km"), Some("0.2".to_string()));
        assert_eq!(config.engine.cluster_radius_km, 0.2);

        config.set("engine.debounce_ms", "250").unwrap();
        assert_eq!(config.engine.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("engine.result_cap", "lots").is_err());
        assert!(config.set("engine.result_cap", "0").is_err());
        assert!(config.set("engine.cluster_radius_km", "-1").is_err());
        assert!(config.set("engine.retention_days", "100000000").is_err());
        assert!(config.set("engine.retention_days", "36500").is_ok());
        assert!(config.set("url.default", "mapquest").is_err());
    }

    #[test]
    fn test_rejected_set_leaves_config_unchanged() {
        let mut config = Config::default();
        assert!(config.set("engine.cluster_radius_km", "-1").is_err());
        assert_eq!(config.engine.cluster_radius_km, DEFAULT_CLUSTER_RADIUS_KM);
        assert!(config.engine.validate().is_ok());

        config.set("engine.result_cap", "100").unwrap();
        assert_eq!(config.engine.result_cap, 100);
    }

    #[test]
    fn test_unknown_keys() {
        let mut config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();

        let url = config
            .format_url(Some("openstreetmap"), 40.7128, -74.0060)
            .unwrap();
        assert_eq!(url, "https://www.openstreetmap.org/#map=18/40.7128/-74.006");

        assert!(config.format_url(None, 1.0, 2.0).unwrap().contains("openstreetmap"));
        assert!(config.format_url(Some("unknown"), 1.0, 2.0).is_err());
    }

    #[test]
    fn test_store_path_override() {
        let mut config = Config::default();
        config.store.path = "/tmp/civicmap-test.json".to_string();
        assert_eq!(
            config.store_path().unwrap(),
            PathBuf::from("/tmp/civicmap-test.json")
        );
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.engine.result_cap = 100;
            config.server.port = 9000;
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.engine.result_cap, 100);
            assert_eq!(loaded.server.port, 9000);
        });
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let loaded: Config = toml::from_str("[engine]\ndebounce_ms = 100\n").unwrap();
        assert_eq!(loaded.engine.debounce_ms, 100);
        assert_eq!(loaded.engine.result_cap, 5000);
        assert_eq!(loaded.server.port, 7878);
    }

    #[test]
    fn test_serialization_format() {
        let toml = toml::to_string_pretty(&Config::default()).unwrap();

        assert!(toml.contains("[engine]"));
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(Config::default().server_addr(), "127.0.0.1:7878");
    }

    #[test]
    fn test_available_keys_resolve() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "{} has no value", key);
        }
    }
}
