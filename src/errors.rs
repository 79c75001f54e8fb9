//! Error types for TV Guide Fetcher
//!
//! This module defines the error types for all components of the crate.
//! Fetch failures inside the scheduler never escape as errors: they collapse
//! into a failed request outcome reported to listeners. The types below are
//! what callers see from configuration, cache maintenance and the handle.

use std::path::PathBuf;
use thiserror::Error;

/// Download and HTTP client errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error")]
    Io(#[from] std::io::Error),

    /// Invalid URL provided or constructed
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Channel has no base URLs to fetch from
    #[error("Channel {channel_id} has no base URLs")]
    NoBaseUrls { channel_id: String },

    /// Explicit 404 from the guide server
    #[error("Guide data not found: {url}")]
    NotFound { url: String },

    /// Server returned an unexpected status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// HTTP client could not be constructed
    #[error("HTTP client configuration error: {reason}")]
    ClientBuild { reason: String },
}

/// Cache management errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache directory not found or not creatable
    #[error("Cache directory not accessible: {path}")]
    DirectoryNotAccessible { path: PathBuf },

    /// No cache directory is active (no service, or media unusable)
    #[error("No active cache directory")]
    Inactive,

    /// I/O error on a cache file
    #[error("Cache I/O error")]
    Io(#[from] std::io::Error),

    /// Validator metadata file could not be parsed or written
    #[error("Invalid cache metadata in {path}")]
    InvalidMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Request queue and scheduler errors
#[derive(Error, Debug)]
pub enum QueueError {
    /// Scheduler task is gone and no longer accepts commands
    #[error("Scheduler channel closed")]
    ChannelError,

    /// Scheduler task panicked or was aborted
    #[error("Scheduler task failed: {reason}")]
    SchedulerFailed { reason: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Configuration serialization failed")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Queue error
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    ///
    /// Nothing is retried automatically; this only tells a caller whether
    /// calling `fetch` again is worthwhile.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Download(DownloadError::Http(_))
            | AppError::Download(DownloadError::ServerError { .. })
            | AppError::Download(DownloadError::Io(_))
            | AppError::Cache(CacheError::Inactive) => true,

            AppError::Download(DownloadError::NotFound { .. })
            | AppError::Download(DownloadError::InvalidUrl { .. })
            | AppError::Download(DownloadError::NoBaseUrls { .. })
            | AppError::Config(_)
            | AppError::Queue(_) => false,

            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Cache(_) => "cache",
            AppError::Queue(_) => "queue",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Queue result type alias
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
