//! Data models for guide requests
//!
//! A [`Channel`] is the opaque collaborator supplied by the caller: an
//! identifier plus the list of candidate base URLs its guide data can be
//! fetched from. [`ChannelDateKey`] identifies one day of one channel and is
//! the unit of deduplication in the request queue.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A television channel whose guide data can be fetched
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier used in cache and request file names
    pub id: String,
    /// Candidate base URLs; one is chosen at random per request
    #[serde(default)]
    pub base_urls: Vec<String>,
}

impl Channel {
    /// Create a channel from an identifier and its base URLs
    pub fn new<I, S>(id: impl Into<String>, base_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            base_urls: base_urls.into_iter().map(Into::into).collect(),
        }
    }
}

/// (channel, calendar date) pair identifying one day of guide data
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelDateKey {
    /// Channel identifier
    pub channel_id: String,
    /// Guide date
    pub date: NaiveDate,
}

impl ChannelDateKey {
    /// Create a key for a channel and date
    pub fn new(channel_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            channel_id: channel_id.into(),
            date,
        }
    }

    /// Check whether this key refers to the given channel and date
    pub fn matches(&self, channel_id: &str, date: NaiveDate) -> bool {
        self.channel_id == channel_id && self.date == date
    }
}

impl fmt::Display for ChannelDateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.channel_id, format_guide_date(self.date))
    }
}

/// Format a date as the fixed-width `YYYY-MM-DD` used in file names
pub fn format_guide_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Build `<channelId>_<YYYY-MM-DD><extension>`
pub fn guide_file_name(channel_id: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}_{}{}", channel_id, format_guide_date(date), extension)
}
