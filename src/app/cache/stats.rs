//! Cache statistics
//!
//! A name-based scan of the active cache directory, used by the `status`
//! command and by callers that want to show how much guide data is cached.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::path::{CacheFileKind, PathGenerator};
use crate::errors::CacheResult;

/// Summary of the cache directory contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of gzip data files
    pub data_files: usize,
    /// Number of validator metadata files
    pub metadata_files: usize,
    /// Total size of all cache files in bytes
    pub total_bytes: u64,
    /// Earliest guide date among data files
    pub oldest_date: Option<NaiveDate>,
    /// Latest guide date among data files
    pub newest_date: Option<NaiveDate>,
}

impl CacheStats {
    /// Scan a cache directory
    pub fn scan(dir: &Path) -> CacheResult<Self> {
        let mut stats = Self::default();

        for entry in fs::read_dir(dir)?.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(kind) = PathGenerator::classify(name) else {
                continue;
            };
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            stats.total_bytes += metadata.len();
            match kind {
                CacheFileKind::Data => {
                    stats.data_files += 1;
                    if let Some(date) = PathGenerator::parse_date(name) {
                        stats.record_date(date);
                    }
                }
                CacheFileKind::Metadata => stats.metadata_files += 1,
            }
        }

        Ok(stats)
    }

    fn record_date(&mut self, date: NaiveDate) {
        self.oldest_date = Some(self.oldest_date.map_or(date, |d| d.min(date)));
        self.newest_date = Some(self.newest_date.map_or(date, |d| d.max(date)));
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} data files, {} metadata files, {} bytes",
            self.data_files, self.metadata_files, self.total_bytes
        )?;
        if let (Some(oldest), Some(newest)) = (self.oldest_date, self.newest_date) {
            write!(f, " ({} to {})", oldest, newest)?;
        }
        Ok(())
    }
}
