//! Core application logic for TV Guide Fetcher
//!
//! This module contains the main application components: the disk cache, the
//! HTTP client, the request queue, the download scheduler and the
//! [`GuideCache`] handle that ties them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use tvguide_fetcher::app::{CacheConfig, Channel, ClientConfig, GuideCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let guide = GuideCache::new(CacheConfig::default(), &ClientConfig::default())?;
//! let channel = Arc::new(Channel::new("ABC-NSW", ["http://xml.oztivo.net/xmltv/"]));
//! let day = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
//!
//! // Today plus the following day, failures on the second day are secondary
//! guide.fetch_window(&channel, day, day)?;
//! guide.fetch_window(&channel, day.succ_opt().unwrap(), day)?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod guide_cache;
pub mod models;
pub mod queue;
pub mod scheduler;

// Re-export main public API
pub use cache::{CacheConfig, CacheManager, CacheStats, CacheValidators, GuideDataReader};
pub use client::{ClientConfig, FetchStatus, GuideClient, GuideFetcher};
pub use guide_cache::GuideCache;
pub use models::{Channel, ChannelDateKey};
pub use queue::{RequestInfo, RequestQueue};
pub use scheduler::{
    EventForwarder, ListenerId, NetworkEvent, NetworkListener, RequestEvent, SchedulerStatus,
};
