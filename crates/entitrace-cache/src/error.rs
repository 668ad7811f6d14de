//! Cache-related error types

use entitrace_index::IndexError;
use thiserror::Error;

/// Snapshot cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Listener '{name}' failed: {message}")]
    Listener { name: String, message: String },
}

impl CacheError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn listener(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Listener {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
