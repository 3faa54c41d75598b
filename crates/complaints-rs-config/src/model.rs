//! Configuration schema for complaint storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Smallest accepted cache capacity.
pub const MIN_CACHE_SIZE: usize = 1;
/// Largest accepted cache capacity.
pub const MAX_CACHE_SIZE: usize = 100_000;
/// Cache capacity used when none is configured.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Directory (relative to the working directory) used when no path is set.
const DEFAULT_RECORDS_DIR: &str = ".complaints/records";

/// Root config for the complaints SDK.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComplaintsConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ComplaintsConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ComplaintsConfigBuilder {
        ComplaintsConfigBuilder::new()
    }
}

/// Builder for assembling a `ComplaintsConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ComplaintsConfigBuilder {
    config: ComplaintsConfig,
}

impl ComplaintsConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ComplaintsConfig::default(),
        }
    }

    /// Set the directory holding one JSON file per record.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.storage.path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Replace the cache configuration.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.storage.cache = cache;
        self
    }

    /// Disable the in-memory cache entirely.
    pub fn without_cache(mut self) -> Self {
        self.config.storage.cache.enabled = false;
        self
    }

    /// Finalize and return the built `ComplaintsConfig`.
    pub fn build(self) -> ComplaintsConfig {
        self.config
    }
}

/// Where records live and how they are cached.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl StorageConfig {
    /// Resolve the records directory, defaulting under `cwd`.
    pub fn resolved_path(&self, cwd: &Path) -> PathBuf {
        match self.path.as_deref() {
            Some(path) => {
                let path = PathBuf::from(path);
                if path.is_absolute() {
                    path
                } else {
                    cwd.join(path)
                }
            }
            None => cwd.join(DEFAULT_RECORDS_DIR),
        }
    }
}

/// In-memory cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_size")]
    pub max_size: usize,
    #[serde(default)]
    pub eviction_policy: EvictionPolicyName,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            max_size: default_cache_size(),
            eviction_policy: EvictionPolicyName::default(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

/// Eviction policy names accepted in config files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicyName {
    #[default]
    Lru,
    Fifo,
    None,
}

impl EvictionPolicyName {
    /// Config spelling of the policy.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Fifo => "fifo",
            Self::None => "none",
        }
    }
}

impl fmt::Display for EvictionPolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
