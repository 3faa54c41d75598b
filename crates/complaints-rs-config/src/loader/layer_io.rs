//! Reading individual config layers from disk.

use super::{
    ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, LoadedLayer, schema,
};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read a layer that may be absent. A missing file yields `None`.
pub(super) fn load_optional_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<Option<LoadedLayer>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_layer(source, path, &contents).map(Some),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no {} config layer at {}", source.as_str(), path.display());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Read a layer the caller asked for explicitly; a missing file is an error.
pub(super) fn load_required_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<LoadedLayer, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_layer(source, path, &contents)
}

fn parse_layer(
    source: ConfigLayerSource,
    path: &Path,
    contents: &str,
) -> Result<LoadedLayer, ConfigError> {
    debug!(
        "parsing config layer (source={}, path={}, len={})",
        source.as_str(),
        path.display(),
        contents.len()
    );
    let value: Value = json5::from_str(contents)?;
    let label = format!("{}({})", source.as_str(), path.display());
    schema::validate_layer_schema(&value, &label)?;
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: path.to_path_buf(),
        },
        value,
    })
}

/// `/etc/complaints/complaints.json5` on Unix; no system layer elsewhere.
pub(super) fn default_system_config_path() -> Option<PathBuf> {
    if cfg!(unix) {
        Some(PathBuf::from(super::SYSTEM_CONFIG_PATH))
    } else {
        None
    }
}

/// `~/.complaints/complaints.json5`, when a home directory is known.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    Some(
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE),
    )
}
