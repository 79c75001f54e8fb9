//! Core cache manager
//!
//! `CacheManager` owns the cache directory state and answers the read side of
//! the cache: path resolution, existence checks, decompressing readers and
//! maintenance. It is shared between the scheduler (which writes through the
//! fetch pipeline) and any number of readers on other threads.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Local, NaiveDate};
use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::app::models::Channel;
use crate::errors::CacheResult;

use super::config::CacheConfig;
use super::directory::CacheDirectory;
use super::expiry;
use super::path::{CacheFileKind, PathGenerator};
use super::stats::CacheStats;

/// Decompressing reader over a cached guide data file
pub type GuideDataReader = GzDecoder<BufReader<File>>;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Main cache management system
#[derive(Debug)]
pub struct CacheManager {
    /// Configuration
    config: CacheConfig,
    /// Media root, service namespace and active directory
    directory: RwLock<CacheDirectory>,
}

impl CacheManager {
    /// Create a new cache manager
    ///
    /// The media root is taken from the configuration or the platform cache
    /// directory. If neither is available the cache starts disabled and can
    /// be enabled later through [`CacheManager::media_usable_changed`].
    pub fn new(config: CacheConfig) -> Self {
        let directory = CacheDirectory::new(config.resolve_root(), config.service_name.clone());

        match directory.http_dir() {
            Some(dir) => info!("Initialized guide cache at {}", dir.display()),
            None => info!("Guide cache initialized without an active directory"),
        }

        Self {
            config,
            directory: RwLock::new(directory),
        }
    }

    /// Get the cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn read_directory(&self) -> RwLockReadGuard<'_, CacheDirectory> {
        self.directory.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_directory(&self) -> RwLockWriteGuard<'_, CacheDirectory> {
        self.directory.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active cache directory, if caching is enabled
    pub fn http_dir(&self) -> Option<PathBuf> {
        self.read_directory().http_dir().map(Path::to_path_buf)
    }

    /// Whether a cache directory is currently active
    pub fn is_active(&self) -> bool {
        self.read_directory().http_dir().is_some()
    }

    /// Name of the service cached underneath, or the empty string
    pub fn service_name(&self) -> String {
        self.read_directory().service_name().to_string()
    }

    /// Change the service namespace; an empty name disables caching
    pub fn set_service_name(&self, service_name: &str) {
        self.write_directory().set_service_name(service_name);
    }

    /// React to storage media becoming usable (`Some(root)`) or unusable
    pub fn media_usable_changed(&self, media_root: Option<PathBuf>) {
        self.write_directory().media_usable_changed(media_root);
    }

    /// Path of a cache file, or `None` when no cache directory is active
    pub fn file_path(&self, channel_id: &str, date: NaiveDate, kind: CacheFileKind) -> Option<PathBuf> {
        self.read_directory()
            .http_dir()
            .map(|dir| PathGenerator::file_path(dir, channel_id, date, kind))
    }

    /// Path of the gzip data file for a channel and date
    pub fn data_file(&self, channel_id: &str, date: NaiveDate) -> Option<PathBuf> {
        self.file_path(channel_id, date, CacheFileKind::Data)
    }

    /// Path of the validator metadata file for a channel and date
    pub fn metadata_file(&self, channel_id: &str, date: NaiveDate) -> Option<PathBuf> {
        self.file_path(channel_id, date, CacheFileKind::Metadata)
    }

    /// Determine if data for a channel and date is available in the cache
    pub fn has_channel_data(&self, channel: &Channel, date: NaiveDate) -> bool {
        self.has_data(&channel.id, date)
    }

    pub(crate) fn has_data(&self, channel_id: &str, date: NaiveDate) -> bool {
        self.data_file(channel_id, date)
            .is_some_and(|path| path.is_file())
    }

    /// Open the cached XMLTV data for a channel and date
    ///
    /// The returned reader decompresses the gzip data as it is read. Returns
    /// `None` when the data is not cached, cannot be opened, or is not gzip.
    pub fn open_channel_data(&self, channel: &Channel, date: NaiveDate) -> Option<GuideDataReader> {
        let path = self.data_file(&channel.id, date)?;
        match open_gzip(&path) {
            Ok(reader) => reader,
            Err(e) => {
                debug!("Failed to open {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Expire entries older than the local calendar day
    pub fn expire(&self) -> CacheResult<usize> {
        self.expire_before(Local::now().date_naive())
    }

    /// Expire entries whose guide date is strictly before `today`
    pub fn expire_before(&self, today: NaiveDate) -> CacheResult<usize> {
        let Some(dir) = self.http_dir() else {
            return Ok(0);
        };
        let deleted = expiry::expire_in(&dir, today, self.config.debug)?;
        if deleted > 0 {
            info!("Expired {} cache files older than {}", deleted, today);
        }
        Ok(deleted)
    }

    /// Clear the entire contents of the cache
    pub fn clear(&self) -> CacheResult<usize> {
        let Some(dir) = self.http_dir() else {
            return Ok(0);
        };
        let deleted = expiry::clear_in(&dir, self.config.debug)?;
        info!("Cleared {} cache files from {}", deleted, dir.display());
        Ok(deleted)
    }

    /// Summarize the cache contents; `None` when no cache directory is active
    pub fn stats(&self) -> CacheResult<Option<CacheStats>> {
        match self.http_dir() {
            Some(dir) => CacheStats::scan(&dir).map(Some),
            None => Ok(None),
        }
    }
}

fn open_gzip(path: &Path) -> std::io::Result<Option<GuideDataReader>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut magic = [0u8; 2];
    if file.read_exact(&mut magic).is_err() || magic != GZIP_MAGIC {
        return Ok(None);
    }
    file.seek(SeekFrom::Start(0))?;

    Ok(Some(GzDecoder::new(BufReader::new(file))))
}
