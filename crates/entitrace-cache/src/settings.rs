//! Snapshot cache configuration
//!
//! Sources, later overriding earlier: built-in defaults, an optional TOML
//! file, then `ENTITRACE_*` environment variables.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ENTITRACE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotCacheConfig {
    /// Upper bound on cached queries; `None` is unbounded
    pub max_entries: Option<usize>,
    /// Record hit/miss/invalidation counters
    pub enable_metrics: bool,
    /// Re-check index invariants after every mutation
    pub verify_consistency: bool,
}

impl Default for SnapshotCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            enable_metrics: true,
            verify_consistency: false,
        }
    }
}

impl SnapshotCacheConfig {
    /// Load from an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(content)?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_entries == Some(0) {
            return Err(CacheError::validation(
                "max_entries must be greater than 0 when set",
            ));
        }
        Ok(())
    }
}
