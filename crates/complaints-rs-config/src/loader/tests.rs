//! Tests for layered configuration loading.

use super::*;
use crate::{ConfigError, EvictionPolicyName};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Options that ignore the machine's real system and user layers.
fn isolated_options(cwd: &Path) -> LayeredConfigOptions {
    let mut options = LayeredConfigOptions::new(cwd);
    options.system_config_path = None;
    options.user_config_path = None;
    options
}

#[test]
fn parse_minimal_config() {
    let config = ComplaintsConfig::load_from_str("{}").expect("config");
    assert!(config.storage.cache.enabled);
    assert_eq!(config.storage.cache.max_size, 1000);
    assert_eq!(config.storage.cache.eviction_policy, EvictionPolicyName::Lru);
    assert_eq!(config.storage.path, None);
}

#[test]
fn parse_full_storage_block() {
    let json5 = r#"{
        // comments are allowed in json5
        storage: {
            path: "/tmp/complaints",
            cache: { enabled: false, max_size: 42, eviction_policy: "fifo" },
        },
    }"#;
    let config = ComplaintsConfig::load_from_str(json5).expect("config");
    assert_eq!(config.storage.path.as_deref(), Some("/tmp/complaints"));
    assert!(!config.storage.cache.enabled);
    assert_eq!(config.storage.cache.max_size, 42);
    assert_eq!(config.storage.cache.eviction_policy, EvictionPolicyName::Fifo);
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = ComplaintsConfig::load_from_str(r#"{ unexpected: true }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("unknown key"));
}

#[test]
fn rejects_invalid_eviction_policy() {
    let json5 = r#"{ storage: { cache: { eviction_policy: "random" } } }"#;
    let err = ComplaintsConfig::load_from_str(json5).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("storage.cache.eviction_policy"));
}

#[test]
fn rejects_cache_size_out_of_range() {
    let err = ComplaintsConfig::load_from_str(r#"{ storage: { cache: { max_size: 0 } } }"#)
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::OutOfRange {
            field: "storage.cache.max_size",
            value: 0,
            ..
        }
    ));

    let err =
        ComplaintsConfig::load_from_str(r#"{ storage: { cache: { max_size: 100001 } } }"#)
            .unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { value: 100001, .. }));
}

#[test]
fn rejects_negative_cache_size() {
    let err = ComplaintsConfig::load_from_str(r#"{ storage: { cache: { max_size: -5 } } }"#)
        .unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("storage.cache.max_size"));
}

#[test]
fn load_from_path_reads_file() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("complaints.json5");
    write_json5(&path, r#"{ storage: { path: "records" } }"#);
    let config = ComplaintsConfig::load_from_path(&path).expect("config");
    assert_eq!(config.storage.path.as_deref(), Some("records"));
}

#[test]
fn layered_config_prefers_cwd_over_project_and_user() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let project_root = root.join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("subdir");
    fs::create_dir_all(&cwd).expect("cwd");

    let user_config = root.join("user.json5");
    write_json5(
        &user_config,
        r#"{ storage: { path: "user", cache: { max_size: 10 } } }"#,
    );
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ storage: { path: "project", cache: { eviction_policy: "fifo" } } }"#,
    );
    write_json5(&cwd.join(DEFAULT_CONFIG_FILE), r#"{ storage: { path: "cwd" } }"#);

    let mut options = isolated_options(&cwd);
    options.user_config_path = Some(user_config);

    let layered = ComplaintsConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.storage.path.as_deref(), Some("cwd"));
    assert_eq!(layered.config.storage.cache.max_size, 10);
    assert_eq!(
        layered.config.storage.cache.eviction_policy,
        EvictionPolicyName::Fifo
    );
    let sources: Vec<_> = layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::User,
            ConfigLayerSource::Project,
            ConfigLayerSource::Cwd
        ]
    );
}

#[test]
fn runtime_layer_wins_and_must_exist() {
    let temp = TempDir::new().expect("tmp");
    let cwd = temp.path().join("work");
    fs::create_dir_all(&cwd).expect("cwd");
    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ storage: { cache: { enabled: true } } }"#,
    );
    let runtime = temp.path().join("runtime.json5");
    write_json5(&runtime, r#"{ storage: { cache: { enabled: false } } }"#);

    let options = isolated_options(&cwd).with_runtime_path(&runtime);
    let layered = ComplaintsConfig::load_layered_with_options(options).expect("layered");
    assert!(!layered.config.storage.cache.enabled);

    let missing = isolated_options(&cwd).with_runtime_path(temp.path().join("missing.json5"));
    let err = ComplaintsConfig::load_layered_with_options(missing).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn project_layer_equal_to_cwd_is_loaded_once() {
    let temp = TempDir::new().expect("tmp");
    let project_root = temp.path().join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ storage: { path: "same" } }"#,
    );

    let layered = ComplaintsConfig::load_layered_with_options(isolated_options(&project_root))
        .expect("layered");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.layers[0].source, ConfigLayerSource::Project);
}

#[test]
fn invalid_layer_reports_its_label() {
    let temp = TempDir::new().expect("tmp");
    let cwd = temp.path().to_path_buf();
    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ storage: { cache: { enabled: "yes" } } }"#,
    );
    let err = ComplaintsConfig::load_layered_with_options(isolated_options(&cwd)).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("cwd("));
    assert!(msg.contains("storage.cache.enabled"));
}
