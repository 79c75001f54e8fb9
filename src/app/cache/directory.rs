//! Cache directory management
//!
//! The active cache directory is `<media root>/<service name>/http`. It only
//! exists while a service name is set and the storage media is usable; every
//! other state leaves no active directory and cache operations degrade to
//! no-ops.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::constants::cache;
use crate::errors::{CacheError, CacheResult};

/// Tracks the media root, the service namespace and the resulting directory
#[derive(Debug, Default)]
pub struct CacheDirectory {
    /// Root of usable storage media; `None` while media is unusable
    media_root: Option<PathBuf>,
    /// Service namespace; empty means no caching
    service_name: String,
    /// Active `http` directory, if any
    http_dir: Option<PathBuf>,
}

impl CacheDirectory {
    /// Create a directory manager and load the service directory if possible
    pub fn new(media_root: Option<PathBuf>, service_name: impl Into<String>) -> Self {
        let mut directory = Self {
            media_root,
            service_name: service_name.into(),
            http_dir: None,
        };
        if directory.is_media_usable() {
            directory.reload_service();
        }
        directory
    }

    /// Name of the service cached underneath, or the empty string
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Change the service namespace
    ///
    /// Setting the current name again does nothing.
    pub fn set_service_name(&mut self, service_name: &str) {
        if self.service_name == service_name {
            return;
        }
        self.service_name = service_name.to_string();
        if self.is_media_usable() {
            self.reload_service();
        } else {
            self.unload_service();
        }
    }

    /// React to storage media becoming usable (`Some(root)`) or unusable
    pub fn media_usable_changed(&mut self, media_root: Option<PathBuf>) {
        self.media_root = media_root;
        if self.is_media_usable() {
            self.reload_service();
        } else {
            info!("Storage media unusable, disabling guide cache");
            self.unload_service();
        }
    }

    /// Whether storage media is currently usable
    pub fn is_media_usable(&self) -> bool {
        self.media_root.is_some()
    }

    /// The active `http` directory, if caching is enabled
    pub fn http_dir(&self) -> Option<&Path> {
        self.http_dir.as_deref()
    }

    fn reload_service(&mut self) {
        if self.service_name.is_empty() {
            debug!("No service name set, guide cache disabled");
            self.unload_service();
            return;
        }

        let Some(root) = self.media_root.as_ref() else {
            self.unload_service();
            return;
        };

        match create_http_dir(&root.join(&self.service_name)) {
            Ok(http_dir) => {
                debug!("Guide cache directory: {}", http_dir.display());
                self.http_dir = Some(http_dir);
            }
            Err(e) => {
                warn!("{}, guide cache disabled", e);
                self.unload_service();
            }
        }
    }

    fn unload_service(&mut self) {
        self.http_dir = None;
    }
}

/// Create `<service_dir>/http` and any missing parents
fn create_http_dir(service_dir: &Path) -> CacheResult<PathBuf> {
    let http_dir = service_dir.join(cache::HTTP_SUBDIR);
    if let Err(e) = fs::create_dir_all(&http_dir) {
        debug!("create_dir_all({}) failed: {}", http_dir.display(), e);
        return Err(CacheError::DirectoryNotAccessible { path: http_dir });
    }
    if !http_dir.is_dir() {
        return Err(CacheError::DirectoryNotAccessible { path: http_dir });
    }
    Ok(http_dir)
}
