//! Guide data cache
//!
//! Downloaded guide data lives on local storage as gzip-compressed XMLTV
//! files, one per channel and day, under `<root>/<service>/http`. This module
//! resolves that directory as media and service settings change, names the
//! files, reads them back, and performs bulk maintenance.
//!
//! # Module Organization
//!
//! - [`config`] - Configuration types and defaults
//! - [`directory`] - Service directory lifecycle and media availability
//! - [`path`] - File naming and date parsing
//! - [`validators`] - ETag/Last-Modified persistence in `.cache` files
//! - [`expiry`] - Date-based expiry and unconditional clearing
//! - [`stats`] - Cache content summary
//! - [`manager`] - Shared cache manager used by readers and the scheduler
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::io::Read;
//! use chrono::NaiveDate;
//! use tvguide_fetcher::app::cache::{CacheConfig, CacheManager};
//! use tvguide_fetcher::app::models::Channel;
//!
//! let cache = CacheManager::new(CacheConfig::default());
//! let channel = Channel::new("abc.example", ["https://guide.example/xmltv/"]);
//! let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
//!
//! if let Some(mut reader) = cache.open_channel_data(&channel, date) {
//!     let mut xml = String::new();
//!     reader.read_to_string(&mut xml).unwrap();
//!     println!("{}", xml);
//! }
//! cache.expire().unwrap();
//! ```

pub mod config;
pub mod directory;
pub mod expiry;
pub mod manager;
pub mod path;
pub mod stats;
pub mod validators;

pub use config::CacheConfig;
pub use directory::CacheDirectory;
pub use manager::{CacheManager, GuideDataReader};
pub use path::{CacheFileKind, PathGenerator};
pub use stats::CacheStats;
pub use validators::CacheValidators;
