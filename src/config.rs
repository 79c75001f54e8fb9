//! Configuration management for TV Guide Fetcher
//!
//! This module provides unified configuration management with automatic
//! first-run initialization, multi-source loading, and zero-config defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{CacheConfig, ClientConfig};
use crate::constants::{cache, config as paths, http, logging};
use crate::errors::{AppError, ConfigError, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Cache location and maintenance settings
    pub cache: CacheConfigToml,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfigToml {
    /// Cache directory path (None = platform cache directory)
    pub cache_root: Option<PathBuf>,
    /// Service namespace; empty disables caching
    pub service_name: String,
    /// Log every file touched by expire and clear at info level
    pub debug: bool,
}

impl Default for CacheConfigToml {
    fn default() -> Self {
        Self {
            cache_root: None,
            service_name: cache::DEFAULT_SERVICE_NAME.to_string(),
            debug: false,
        }
    }
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// User-Agent header value
    pub user_agent: String,
    /// TCP keep-alive timeout in seconds (None = disabled)
    pub tcp_keepalive_secs: Option<u64>,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            user_agent: http::USER_AGENT.to_string(),
            tcp_keepalive_secs: Some(http::TCP_KEEPALIVE.as_secs()),
            tcp_nodelay: true,
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> (CacheConfig, ClientConfig) {
        (
            self.cache.to_runtime_config(),
            self.client.to_runtime_config(),
        )
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.client.user_agent.trim().is_empty() {
            return Err(invalid("client.user_agent", "", "User agent must not be empty"));
        }
        if self.client.request_timeout_secs == 0 {
            return Err(invalid(
                "client.request_timeout_secs",
                "0",
                "Timeout must be at least one second",
            ));
        }
        if self.client.connect_timeout_secs == 0 {
            return Err(invalid(
                "client.connect_timeout_secs",
                "0",
                "Timeout must be at least one second",
            ));
        }
        if !matches!(
            self.logging.level.as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            return Err(invalid(
                "logging.level",
                &self.logging.level,
                "Expected one of error, warn, info, debug, trace",
            ));
        }
        Ok(())
    }

    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (explicit, then project-local, then user config dir)
    /// 3. CLI arguments, applied by the caller through [`AppConfig::apply_overrides`]
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file_override {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound { path }.into());
            }
            Some(path) => Some(path),
            None => Self::find_config_file(),
        };

        let config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file settings
    pub fn apply_overrides(
        &mut self,
        cache_root: Option<PathBuf>,
        service_name: Option<String>,
        debug: bool,
    ) {
        if let Some(root) = cache_root {
            self.cache.cache_root = Some(root);
        }
        if let Some(name) = service_name {
            self.cache.service_name = name;
        }
        self.cache.debug |= debug;
    }

    /// Initialize configuration on first run
    ///
    /// Creates a default config file if none exists and returns its path.
    pub async fn initialize_first_run() -> Result<Option<PathBuf>> {
        let Some(config_path) = Self::default_config_path() else {
            return Ok(None);
        };

        if config_path.exists() {
            return Ok(Some(config_path));
        }

        info!("Creating default configuration file...");

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::generic(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(&config_path, Self::generate_default_config_content())
            .await
            .map_err(|e| {
                AppError::generic(format!(
                    "Failed to write config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;

        info!("Created default configuration at {}", config_path.display());
        Ok(Some(config_path))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(paths::LOCAL_CONFIG_FILE)];
        search_paths.extend(Self::default_config_path());

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(paths::CONFIG_DIR_NAME).join(paths::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::generic(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::from)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Serialize the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::from)?)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# TV Guide Fetcher Configuration
# This file was automatically generated on first run.

[cache]
# Cache directory (leave unset to use the platform cache directory)
# cache_root = "/path/to/custom/cache"

# Guide service; files live under <cache_root>/<service_name>/http
service_name = "{}"

# Log each file removed by expire and clear
debug = false

[client]
user_agent = "{}"
tcp_keepalive_secs = {}
tcp_nodelay = true
pool_idle_timeout_secs = {}
request_timeout_secs = {}
connect_timeout_secs = {}

[logging]
level = "{}"  # error, warn, info, debug, trace
"#,
            cache::DEFAULT_SERVICE_NAME,
            http::USER_AGENT,
            http::TCP_KEEPALIVE.as_secs(),
            http::POOL_IDLE_TIMEOUT.as_secs(),
            http::DEFAULT_TIMEOUT.as_secs(),
            http::CONNECT_TIMEOUT.as_secs(),
            logging::DEFAULT_LOG_LEVEL,
        )
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> AppError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl CacheConfigToml {
    /// Convert to runtime CacheConfig
    pub fn to_runtime_config(&self) -> CacheConfig {
        CacheConfig {
            cache_root: self.cache_root.clone(),
            service_name: self.service_name.clone(),
            debug: self.debug,
        }
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self.user_agent.clone(),
            tcp_keepalive: self.tcp_keepalive_secs.map(Duration::from_secs),
            tcp_nodelay: self.tcp_nodelay,
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}
