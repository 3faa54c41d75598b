//! Eviction policy and validated cache settings.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest accepted cache capacity.
pub const MIN_CACHE_SIZE: usize = 1;
/// Largest accepted cache capacity.
pub const MAX_CACHE_SIZE: usize = 100_000;
/// Capacity used when the caller has no preference.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Rule for picking a victim once the cache is full.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Evict the least recently read or written entry.
    #[default]
    Lru,
    /// Evict the oldest inserted entry regardless of access.
    Fifo,
    /// Never evict; grow past capacity with a warning.
    None,
}

impl EvictionPolicy {
    /// Lowercase config name.
    pub fn as_str(self) -> &'static str {
        match self {
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Fifo => "fifo",
            EvictionPolicy::None => "none",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "fifo" => Ok(EvictionPolicy::Fifo),
            "none" => Ok(EvictionPolicy::None),
            other => Err(StoreError::InvalidConfiguration(format!(
                "unknown eviction policy {other:?} (expected lru, fifo or none)"
            ))),
        }
    }
}

/// Capacity and policy for a `RecordCache`, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    max_size: usize,
    policy: EvictionPolicy,
}

impl CacheSettings {
    /// Validate `max_size` against `MIN_CACHE_SIZE..=MAX_CACHE_SIZE`.
    pub fn new(max_size: usize, policy: EvictionPolicy) -> Result<Self, StoreError> {
        if !(MIN_CACHE_SIZE..=MAX_CACHE_SIZE).contains(&max_size) {
            return Err(StoreError::InvalidConfiguration(format!(
                "cache max_size {max_size} outside {MIN_CACHE_SIZE}..={MAX_CACHE_SIZE}"
            )));
        }
        Ok(Self { max_size, policy })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CACHE_SIZE,
            policy: EvictionPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheSettings, EvictionPolicy, MAX_CACHE_SIZE};
    use crate::error::StoreError;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_policy_names() {
        assert_eq!("lru".parse::<EvictionPolicy>().expect("lru"), EvictionPolicy::Lru);
        assert_eq!("FIFO".parse::<EvictionPolicy>().expect("fifo"), EvictionPolicy::Fifo);
        assert_eq!("none".parse::<EvictionPolicy>().expect("none"), EvictionPolicy::None);
        assert!(matches!(
            "random".parse::<EvictionPolicy>(),
            Err(StoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_sizes_outside_range() {
        assert!(CacheSettings::new(0, EvictionPolicy::Lru).is_err());
        assert!(CacheSettings::new(MAX_CACHE_SIZE + 1, EvictionPolicy::Lru).is_err());
        let settings = CacheSettings::new(MAX_CACHE_SIZE, EvictionPolicy::Fifo).expect("max");
        assert_eq!(settings.max_size(), MAX_CACHE_SIZE);
        assert_eq!(settings.policy(), EvictionPolicy::Fifo);
    }
}
