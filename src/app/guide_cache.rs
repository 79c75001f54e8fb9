//! Application-facing guide cache handle
//!
//! [`GuideCache`] ties the disk cache to a download scheduler. Reads go
//! straight to the cache from the calling thread; fetches and listener
//! changes are sent to the scheduler task. The application creates one
//! handle and passes it (or an `Arc` of it) to whatever needs guide data.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use tvguide_fetcher::app::{CacheConfig, Channel, ClientConfig, GuideCache, NetworkEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let guide = GuideCache::new(CacheConfig::default(), &ClientConfig::default())?;
//! let (_id, mut events) = guide.subscribe()?;
//!
//! let channel = Arc::new(Channel::new("ABC-NSW", ["http://xml.oztivo.net/xmltv/"]));
//! let day = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
//! guide.fetch(&channel, day)?;
//!
//! while let Some(event) = events.recv().await {
//!     if event == NetworkEvent::RequestsFinished {
//!         break;
//!     }
//! }
//!
//! if let Some(mut reader) = guide.open_channel_data(&channel, day) {
//!     let mut xml = String::new();
//!     reader.read_to_string(&mut xml)?;
//! }
//! guide.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::cache::{CacheConfig, CacheManager, CacheStats, GuideDataReader};
use crate::app::client::{build_request_url, ClientConfig, GuideClient, GuideFetcher};
use crate::app::models::{Channel, ChannelDateKey};
use crate::app::queue::RequestInfo;
use crate::app::scheduler::{
    DownloadScheduler, EventForwarder, ListenerId, NetworkEvent, NetworkListener,
    SchedulerCommand, SchedulerStatus,
};
use crate::errors::{CacheResult, QueueError, QueueResult, Result};

/// Cache reads plus a single-flight download scheduler
pub struct GuideCache {
    cache: Arc<CacheManager>,
    commands: mpsc::UnboundedSender<SchedulerCommand>,
    next_listener_id: AtomicU64,
    scheduler: Option<JoinHandle<()>>,
}

impl GuideCache {
    /// Create a guide cache that fetches over HTTP
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cache_config: CacheConfig, client_config: &ClientConfig) -> Result<Self> {
        let client = GuideClient::with_config(client_config)?;
        let cache = Arc::new(CacheManager::new(cache_config));
        Ok(Self::with_fetcher(cache, client))
    }

    /// Create a guide cache around an existing cache manager and fetcher
    pub fn with_fetcher<F: GuideFetcher>(cache: Arc<CacheManager>, fetcher: F) -> Self {
        let (commands, scheduler) = DownloadScheduler::spawn(Arc::clone(&cache), Arc::new(fetcher));
        Self {
            cache,
            commands,
            next_listener_id: AtomicU64::new(1),
            scheduler: Some(scheduler),
        }
    }

    /// The underlying cache manager
    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn service_name(&self) -> String {
        self.cache.service_name()
    }

    /// Change the service namespace; an empty name disables caching
    pub fn set_service_name(&self, service_name: &str) {
        self.cache.set_service_name(service_name);
    }

    /// React to storage media becoming usable (`Some(root)`) or unusable
    pub fn media_usable_changed(&self, media_root: Option<PathBuf>) {
        self.cache.media_usable_changed(media_root);
    }

    /// Open the cached XMLTV data for a channel and date
    pub fn open_channel_data(&self, channel: &Channel, date: NaiveDate) -> Option<GuideDataReader> {
        self.cache.open_channel_data(channel, date)
    }

    pub fn has_channel_data(&self, channel: &Channel, date: NaiveDate) -> bool {
        self.cache.has_channel_data(channel, date)
    }

    /// Request guide data for one day
    ///
    /// Returns `Ok(false)` when no request was issued: caching is inactive,
    /// the channel has no base URLs, or the request URL is malformed.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ChannelError` if the scheduler has stopped.
    pub fn fetch(&self, channel: &Arc<Channel>, date: NaiveDate) -> QueueResult<bool> {
        self.submit(channel, date, date, false)
    }

    /// Request one day of a multi-day window anchored on `primary_date`
    ///
    /// Failures for days other than the primary one are still reported, but
    /// carry a different primary date so the caller can ignore them.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ChannelError` if the scheduler has stopped.
    pub fn fetch_window(
        &self,
        channel: &Arc<Channel>,
        date: NaiveDate,
        primary_date: NaiveDate,
    ) -> QueueResult<bool> {
        self.submit(channel, date, primary_date, false)
    }

    /// Fetch again even if the data is already cached
    ///
    /// Stored validators are still sent, so an unchanged file costs a 304.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ChannelError` if the scheduler has stopped.
    pub fn refresh(&self, channel: &Arc<Channel>, date: NaiveDate) -> QueueResult<bool> {
        self.submit(channel, date, date, true)
    }

    /// Forced refetch of one day of a window anchored on `primary_date`
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ChannelError` if the scheduler has stopped.
    pub fn refresh_window(
        &self,
        channel: &Arc<Channel>,
        date: NaiveDate,
        primary_date: NaiveDate,
    ) -> QueueResult<bool> {
        self.submit(channel, date, primary_date, true)
    }

    fn submit(
        &self,
        channel: &Arc<Channel>,
        date: NaiveDate,
        primary_date: NaiveDate,
        refresh: bool,
    ) -> QueueResult<bool> {
        let key = ChannelDateKey::new(channel.id.clone(), date);

        let (Some(data_file), Some(metadata_file)) = (
            self.cache.data_file(&channel.id, date),
            self.cache.metadata_file(&channel.id, date),
        ) else {
            debug!("Cache inactive, not fetching {}", key);
            return Ok(false);
        };

        let url = match build_request_url(channel, date, &mut rand::thread_rng()) {
            Ok(url) => url,
            Err(e) => {
                debug!("Not fetching {}: {}", key, e);
                return Ok(false);
            }
        };

        let request = RequestInfo::new(
            Arc::clone(channel),
            date,
            primary_date,
            url,
            data_file,
            metadata_file,
        )
        .with_refresh(refresh);

        self.send(SchedulerCommand::Enqueue(request))?;
        Ok(true)
    }

    /// Expire entries older than the local calendar day
    pub fn expire(&self) -> CacheResult<usize> {
        self.cache.expire()
    }

    /// Expire entries whose guide date is strictly before `today`
    pub fn expire_before(&self, today: NaiveDate) -> CacheResult<usize> {
        self.cache.expire_before(today)
    }

    /// Delete every data and metadata file in the active cache directory
    pub fn clear(&self) -> CacheResult<usize> {
        self.cache.clear()
    }

    pub fn stats(&self) -> CacheResult<Option<CacheStats>> {
        self.cache.stats()
    }

    /// Register a listener for scheduler events
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ChannelError` if the scheduler has stopped.
    pub fn add_listener<L>(&self, listener: L) -> QueueResult<ListenerId>
    where
        L: NetworkListener + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.send(SchedulerCommand::AddListener(id, Arc::new(listener)))?;
        Ok(id)
    }

    /// Unregister a listener; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ChannelError` if the scheduler has stopped.
    pub fn remove_listener(&self, id: ListenerId) -> QueueResult<()> {
        self.send(SchedulerCommand::RemoveListener(id))
    }

    /// Register a listener that forwards events into a channel
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ChannelError` if the scheduler has stopped.
    pub fn subscribe(&self) -> QueueResult<(ListenerId, mpsc::UnboundedReceiver<NetworkEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.add_listener(EventForwarder(tx))?;
        Ok((id, rx))
    }

    /// Snapshot of the scheduler state
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ChannelError` if the scheduler has stopped.
    pub async fn status(&self) -> QueueResult<SchedulerStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(SchedulerCommand::Status(tx))?;
        rx.await.map_err(|_| QueueError::ChannelError)
    }

    /// Stop the scheduler after the in-flight fetch completes
    ///
    /// Requests still waiting in the queue are dropped.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::SchedulerFailed` if the scheduler task panicked.
    pub async fn shutdown(mut self) -> QueueResult<()> {
        // Already stopped is fine; the join below reports any failure
        let _ = self.commands.send(SchedulerCommand::Shutdown);

        if let Some(scheduler) = self.scheduler.take() {
            scheduler.await.map_err(|e| QueueError::SchedulerFailed {
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    fn send(&self, command: SchedulerCommand) -> QueueResult<()> {
        self.commands
            .send(command)
            .map_err(|_| QueueError::ChannelError)
    }
}

impl std::fmt::Debug for GuideCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuideCache")
            .field("cache", &self.cache)
            .field("running", &self.scheduler.is_some())
            .finish()
    }
}
