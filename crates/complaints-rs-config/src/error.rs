//! Error types for config loading and validation.

use thiserror::Error;

/// Errors returned while loading or validating storage config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config layer from disk failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// A config layer is not valid JSON5.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The merged JSON value did not decode into the schema types.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A field has the wrong shape or is not part of the schema.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A numeric setting falls outside its allowed range.
    #[error("config value {field}={value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}
