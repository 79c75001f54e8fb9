//! Prelude module for TV Guide Fetcher Library
//!
//! Re-exports the items most integrations need, so a single
//! `use tvguide_fetcher::prelude::*;` is enough for typical usage.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tvguide_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None).await?;
//!     let (cache_config, client_config) = config.to_runtime_config();
//!     let guide = GuideCache::new(cache_config, &client_config)?;
//!     println!("{:?}", guide.stats()?);
//!     guide.shutdown().await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

pub use crate::config::AppConfig;

pub use crate::app::{
    CacheConfig, CacheManager, CacheStats, Channel, ChannelDateKey, ClientConfig, GuideCache,
    GuideClient, GuideFetcher, ListenerId, NetworkEvent, NetworkListener, RequestEvent,
    SchedulerStatus,
};
