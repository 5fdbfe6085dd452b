use std::path::PathBuf;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors from saving or loading utility tables and network weights.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        source: rmp_serde::encode::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: rmp_serde::decode::Error,
    },

    #[error("{path} holds a malformed network: {reason}")]
    Shape { path: PathBuf, reason: String },

    #[error("{path} was written for '{found}', expected '{expected}'")]
    FingerprintMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}
