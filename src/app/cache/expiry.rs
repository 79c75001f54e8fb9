//! Cache expiry and clearing
//!
//! Both operations scan the active cache directory by file name only. A file
//! is considered part of the cache when its name ends in `.xml.gz` or `.cache`
//! and carries a date-length stem; everything else is left alone.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::path::PathGenerator;
use crate::errors::CacheResult;

/// Delete cache files whose guide date is strictly before `today`
///
/// Files whose date component does not parse are kept.
pub fn expire_in(dir: &Path, today: NaiveDate, verbose: bool) -> CacheResult<usize> {
    sweep(dir, verbose, "expiring", |name| {
        PathGenerator::parse_date(name).is_some_and(|date| date < today)
    })
}

/// Delete every cache file regardless of date
pub fn clear_in(dir: &Path, verbose: bool) -> CacheResult<usize> {
    sweep(dir, verbose, "deleting", |name| {
        PathGenerator::classify(name).is_some()
    })
}

fn sweep<F>(dir: &Path, verbose: bool, action: &str, should_delete: F) -> CacheResult<usize>
where
    F: Fn(&str) -> bool,
{
    let mut deleted = 0;

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read cache directory entry: {}", e);
                continue;
            }
        };

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !should_delete(name) {
            continue;
        }
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        if verbose {
            info!("{} {}", action, path.display());
        } else {
            debug!("{} {}", action, path.display());
        }
        match fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
        }
    }

    Ok(deleted)
}
