//! Request queue for guide downloads
//!
//! Requests are kept in arrival order and deduplicated by channel and date
//! across both the waiting entries and the one in-flight request. A duplicate
//! never produces a second download: it only upgrades the existing entry to
//! primary (and to a forced refresh) when asked.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use url::Url;
//! use tvguide_fetcher::app::models::Channel;
//! use tvguide_fetcher::app::queue::{RequestInfo, RequestQueue};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = Arc::new(Channel::new("abc", ["https://guide.example/"]));
//! let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
//! let request = RequestInfo::new(
//!     channel,
//!     date,
//!     date,
//!     Url::parse("https://guide.example/abc_2021-06-01.xml.gz")?,
//!     PathBuf::from("/tmp/abc_2021-06-01.xml.gz"),
//!     PathBuf::from("/tmp/abc_2021-06-01.cache"),
//! );
//!
//! let mut queue = RequestQueue::new();
//! assert!(queue.enqueue(request.clone()).is_queued());
//! assert!(!queue.enqueue(request).is_queued());
//! assert_eq!(queue.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export main types for public API
pub use core::RequestQueue;
pub use types::{EnqueueOutcome, InFlightRequest, RequestInfo};
