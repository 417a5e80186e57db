//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Clustering proximity radius in kilometers (50 m)
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 0.05;

/// Duplicate-submission radius in kilometers (100 m)
pub const DEFAULT_DUPLICATE_RADIUS_KM: f64 = 0.1;

/// Only records younger than this many days are shown on the map
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

/// Upper bound for `retention_days` (about a century)
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Maximum rows fetched per viewport query
pub const DEFAULT_RESULT_CAP: usize = 5000;

/// Viewport change debounce interval in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 600;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "civicmap";
