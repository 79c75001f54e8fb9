//! Cache file naming
//!
//! Every cache entry is a pair of files in the service's `http` directory:
//! `<channelId>_<YYYY-MM-DD>.xml.gz` holding the gzip XMLTV payload and
//! `<channelId>_<YYYY-MM-DD>.cache` holding HTTP validators. Names are a pure
//! function of the inputs, so they survive restarts.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::app::models::guide_file_name;
use crate::constants::cache;

/// The two kinds of file making up a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheFileKind {
    /// Gzip-compressed XMLTV data
    Data,
    /// Validator metadata
    Metadata,
}

impl CacheFileKind {
    /// File extension including the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            CacheFileKind::Data => cache::DATA_EXTENSION,
            CacheFileKind::Metadata => cache::METADATA_EXTENSION,
        }
    }
}

/// Path generation utility for cache files
pub struct PathGenerator;

impl PathGenerator {
    /// File name for a channel, date and kind
    pub fn file_name(channel_id: &str, date: NaiveDate, kind: CacheFileKind) -> String {
        guide_file_name(channel_id, date, kind.extension())
    }

    /// Full path of a cache file under `http_dir`
    pub fn file_path(
        http_dir: &Path,
        channel_id: &str,
        date: NaiveDate,
        kind: CacheFileKind,
    ) -> PathBuf {
        http_dir.join(Self::file_name(channel_id, date, kind))
    }

    /// Classify a directory entry name as a cache file
    ///
    /// A name qualifies when it ends in one of the cache extensions and the
    /// stem is long enough to hold a `YYYY-MM-DD` component.
    pub fn classify(name: &str) -> Option<CacheFileKind> {
        let kind = if name.ends_with(cache::DATA_EXTENSION) {
            CacheFileKind::Data
        } else if name.ends_with(cache::METADATA_EXTENSION) {
            CacheFileKind::Metadata
        } else {
            return None;
        };

        let stem_len = name.len() - kind.extension().len();
        (stem_len >= cache::DATE_COMPONENT_LEN).then_some(kind)
    }

    /// Parse the guide date encoded at the end of a cache file name
    ///
    /// Returns `None` for anything that is not a cache file with a valid
    /// calendar date; such files are never treated as expirable.
    pub fn parse_date(name: &str) -> Option<NaiveDate> {
        let kind = Self::classify(name)?;
        let stem = &name[..name.len() - kind.extension().len()];
        let field = stem.get(stem.len() - cache::DATE_COMPONENT_LEN..)?;

        let bytes = field.as_bytes();
        if !field.is_ascii() || bytes[4] != b'-' || bytes[7] != b'-' {
            return None;
        }

        let year = parse_digits(&field[0..4])?;
        let month = parse_digits(&field[5..7])?;
        let day = parse_digits(&field[8..10])?;
        NaiveDate::from_ymd_opt(year as i32, month, day)
    }
}

fn parse_digits(field: &str) -> Option<u32> {
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
