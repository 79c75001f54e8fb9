//! Application constants for TV Guide Fetcher
//!
//! This module centralizes all constants used throughout the crate,
//! organized by functional domain.

use std::time::Duration;

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for guide requests
    pub const USER_AGENT: &str = "TVGuide-Fetcher/0.1 (XMLTV)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// TCP keep-alive interval
    pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Value sent in the Accept-Encoding header
    pub const ACCEPT_ENCODING: &str = "gzip";
}

/// Cache layout constants
pub mod cache {
    /// Service namespace used when none is configured
    pub const DEFAULT_SERVICE_NAME: &str = "OzTivo";

    /// Application directory under the platform cache root
    pub const APP_DIR_NAME: &str = "tvguide-fetcher";

    /// Subdirectory of a service directory holding downloaded files
    pub const HTTP_SUBDIR: &str = "http";

    /// Extension of gzip-compressed XMLTV data files
    pub const DATA_EXTENSION: &str = ".xml.gz";

    /// Extension of validator metadata files
    pub const METADATA_EXTENSION: &str = ".cache";

    /// Length of the `YYYY-MM-DD` component at the end of a file stem
    pub const DATE_COMPONENT_LEN: usize = 10;
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";
}

/// Configuration file locations
pub mod config {
    /// Directory name under the user config directory
    pub const CONFIG_DIR_NAME: &str = "tvguide-fetcher";

    /// Config file name inside the config directory
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    /// Project-local config file
    pub const LOCAL_CONFIG_FILE: &str = "./tvguide-fetcher.toml";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

// Re-export commonly used constants for convenience
pub use cache::{DATA_EXTENSION, DEFAULT_SERVICE_NAME, METADATA_EXTENSION};
pub use files::TEMP_FILE_SUFFIX;
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
