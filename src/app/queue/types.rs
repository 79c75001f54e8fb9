//! Core data structures for the request queue
//!
//! This module defines the pending request record, the in-flight slot and the
//! outcome of enqueuing a request.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use url::Url;

use crate::app::cache::CacheValidators;
use crate::app::models::{Channel, ChannelDateKey};

/// One pending or in-flight fetch
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Channel the data belongs to
    pub channel: Arc<Channel>,
    /// Guide date being fetched
    pub date: NaiveDate,
    /// Anchor date of the request window; equal to `date` for primary requests
    pub primary_date: NaiveDate,
    /// Resolved source URL
    pub url: Url,
    /// Cache data file the body is written to
    pub data_file: PathBuf,
    /// Cache metadata file holding validators
    pub metadata_file: PathBuf,
    /// Conditional-request validators
    pub validators: CacheValidators,
    /// Skip the cache-hit shortcut and ask the server again
    pub refresh: bool,
    /// Set once the fetch has succeeded
    pub success: bool,
    /// Set when the server answered 404
    pub not_found: bool,
}

impl RequestInfo {
    /// Create a new request for a channel and date
    pub fn new(
        channel: Arc<Channel>,
        date: NaiveDate,
        primary_date: NaiveDate,
        url: Url,
        data_file: PathBuf,
        metadata_file: PathBuf,
    ) -> Self {
        Self {
            channel,
            date,
            primary_date,
            url,
            data_file,
            metadata_file,
            validators: CacheValidators::default(),
            refresh: false,
            success: false,
            not_found: false,
        }
    }

    /// Mark this request as a forced refresh
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Deduplication key
    pub fn key(&self) -> ChannelDateKey {
        ChannelDateKey::new(self.channel.id.clone(), self.date)
    }

    /// Whether this request is for the same channel and date
    pub fn matches(&self, channel_id: &str, date: NaiveDate) -> bool {
        self.channel.id == channel_id && self.date == date
    }

    /// Whether failure of this request should be surfaced to the user
    pub fn is_primary(&self) -> bool {
        self.primary_date == self.date
    }
}

/// The request currently being fetched
///
/// Kept by the queue so duplicates can be merged into it and so the merged
/// primary date is the one reported when the fetch completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightRequest {
    /// Channel the data belongs to
    pub channel: Arc<Channel>,
    /// Guide date being fetched
    pub date: NaiveDate,
    /// Anchor date, possibly upgraded while in flight
    pub primary_date: NaiveDate,
}

impl InFlightRequest {
    /// Whether this in-flight request is for the same channel and date
    pub fn matches(&self, channel_id: &str, date: NaiveDate) -> bool {
        self.channel.id == channel_id && self.date == date
    }

    /// Deduplication key
    pub fn key(&self) -> ChannelDateKey {
        ChannelDateKey::new(self.channel.id.clone(), self.date)
    }
}

impl From<&RequestInfo> for InFlightRequest {
    fn from(request: &RequestInfo) -> Self {
        Self {
            channel: Arc::clone(&request.channel),
            date: request.date,
            primary_date: request.primary_date,
        }
    }
}

/// Result of adding a request to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended to the tail as a new entry
    Queued,
    /// Merged into an entry already waiting in the queue
    MergedPending {
        /// The existing entry became primary
        upgraded: bool,
    },
    /// Merged into the request currently being fetched
    MergedInFlight {
        /// The in-flight request became primary
        upgraded: bool,
    },
}

impl EnqueueOutcome {
    /// Whether a new entry was added
    pub fn is_queued(self) -> bool {
        matches!(self, EnqueueOutcome::Queued)
    }
}
