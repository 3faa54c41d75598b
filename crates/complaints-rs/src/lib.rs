//! Public SDK surface for complaints-rs.
//!
//! This crate re-exports the storage and config building blocks and wires
//! them together: a loaded `ComplaintsConfig` becomes a ready repository.

/// Re-export for convenience.
pub use complaints_rs_config as config;
/// Re-export for convenience.
pub use complaints_rs_store as store;

pub use complaints_rs_config::{
    ComplaintsConfig, ConfigError, EvictionPolicyName, LayeredConfigOptions,
};
pub use complaints_rs_store::{
    CacheSettings, CacheStats, ComplaintRecord, ComplaintRepository, EvictionPolicy, LogTracer,
    NewComplaint, NoopTracer, Severity, StoreError, Tracer,
};

use log::info;
use std::path::Path;
use std::sync::Arc;

/// Failure while turning configuration into a repository.
#[derive(Debug, thiserror::Error)]
pub enum ComplaintsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

/// Cache settings for `config`, or `None` when caching is disabled.
pub fn cache_settings(config: &ComplaintsConfig) -> Result<Option<CacheSettings>, StoreError> {
    let cache = &config.storage.cache;
    if !cache.enabled {
        return Ok(None);
    }
    let policy: EvictionPolicy = cache.eviction_policy.as_str().parse()?;
    CacheSettings::new(cache.max_size, policy).map(Some)
}

/// Build the repository described by `config`, resolving relative paths
/// against `cwd`.
pub fn open_repository(
    config: &ComplaintsConfig,
    cwd: &Path,
    tracer: Arc<dyn Tracer>,
) -> Result<Arc<dyn ComplaintRepository>, StoreError> {
    let root = config.storage.resolved_path(cwd);
    let cache = cache_settings(config)?;
    info!(
        "opening complaint repository (root={}, cached={})",
        root.display(),
        cache.is_some()
    );
    Ok(complaints_rs_store::build_repository(root, cache, tracer))
}

/// Load the layered config described by `options` and open its repository.
///
/// Relative storage paths resolve against `options.cwd`.
pub fn open_layered(
    options: LayeredConfigOptions,
    tracer: Arc<dyn Tracer>,
) -> Result<Arc<dyn ComplaintRepository>, ComplaintsError> {
    let cwd = options.cwd.clone();
    let layered = ComplaintsConfig::load_layered_with_options(options)?;
    Ok(open_repository(&layered.config, &cwd, tracer)?)
}
