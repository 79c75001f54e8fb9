//! Cache configuration types and defaults
//!
//! This module contains the configuration structure for the guide cache,
//! including default values and builder helpers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::cache;

/// Configuration for the guide cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Storage root the service directories live under (OS-specific if None)
    pub cache_root: Option<PathBuf>,
    /// Service namespace; an empty name disables caching
    pub service_name: String,
    /// Log every maintenance deletion and fetch result at info level
    pub debug: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_root: None, // Will use OS-specific cache directory
            service_name: cache::DEFAULT_SERVICE_NAME.to_string(),
            debug: false,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with custom cache root
    pub fn with_cache_root(cache_root: PathBuf) -> Self {
        Self {
            cache_root: Some(cache_root),
            ..Default::default()
        }
    }

    /// Set the service namespace
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// Enable or disable verbose maintenance logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Resolve the storage root, falling back to the platform cache directory
    ///
    /// Returns `None` when no root is configured and the platform has no
    /// cache directory, which the cache treats as unusable media.
    pub fn resolve_root(&self) -> Option<PathBuf> {
        self.cache_root
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(cache::APP_DIR_NAME)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_root, None);
        assert_eq!(config.service_name, "OzTivo");
        assert!(!config.debug);
    }

    #[test]
    fn test_config_builder() {
        let cache_root = PathBuf::from("/tmp/test");
        let config = CacheConfig::with_cache_root(cache_root.clone())
            .with_service_name("Other")
            .with_debug(true);

        assert_eq!(config.cache_root, Some(cache_root.clone()));
        assert_eq!(config.service_name, "Other");
        assert!(config.debug);
        assert_eq!(config.resolve_root(), Some(cache_root));
    }
}
