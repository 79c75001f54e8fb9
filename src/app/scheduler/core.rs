//! Download scheduler task
//!
//! The scheduler is a single tokio task that owns the request queue, the
//! listener registry and the in-flight fetch. Commands arrive over an
//! unbounded channel and fetch completions are joined in the same
//! `select!` loop, so queue mutation and listener dispatch never run
//! concurrently and at most one fetch exists at any time.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::app::cache::CacheManager;
use crate::app::client::GuideFetcher;
use crate::app::models::ChannelDateKey;
use crate::app::queue::{RequestInfo, RequestQueue};

use super::events::{NetworkEvent, RequestEvent};
use super::listeners::{ListenerId, ListenerRegistry, NetworkListener};
use super::task::{execute_request, remove_cache_files};

/// Messages accepted by the scheduler task
pub enum SchedulerCommand {
    /// Add a request to the queue
    Enqueue(RequestInfo),
    AddListener(ListenerId, Arc<dyn NetworkListener>),
    RemoveListener(ListenerId),
    /// Report a status snapshot
    Status(oneshot::Sender<SchedulerStatus>),
    /// Stop accepting commands and drop waiting requests
    Shutdown,
}

impl fmt::Debug for SchedulerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerCommand::Enqueue(request) => {
                f.debug_tuple("Enqueue").field(&request.key()).finish()
            }
            SchedulerCommand::AddListener(id, _) => f.debug_tuple("AddListener").field(id).finish(),
            SchedulerCommand::RemoveListener(id) => {
                f.debug_tuple("RemoveListener").field(id).finish()
            }
            SchedulerCommand::Status(_) => f.write_str("Status"),
            SchedulerCommand::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Snapshot of scheduler state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStatus {
    /// Requests waiting in the queue
    pub queued: usize,
    /// Key of the request being fetched
    pub in_flight: Option<ChannelDateKey>,
    /// Whether fetches have run since the queue last drained
    pub requests_active: bool,
    pub listeners: usize,
    /// Fetches that succeeded
    pub completed: u64,
    /// Fetches that failed
    pub failed: u64,
    /// Queue entries satisfied by data already on disk
    pub cache_hits: u64,
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.in_flight {
            Some(key) => write!(f, "fetching {}", key)?,
            None => write!(f, "idle")?,
        }
        write!(
            f,
            ", {} queued, {} completed, {} failed, {} cache hits",
            self.queued, self.completed, self.failed, self.cache_hits
        )
    }
}

/// The spawned fetch plus the files to clean up if it never reports back
struct FetchTask {
    handle: JoinHandle<RequestInfo>,
    data_file: PathBuf,
    metadata_file: PathBuf,
}

/// Single-flight download scheduler
pub struct DownloadScheduler<F: GuideFetcher> {
    cache: Arc<CacheManager>,
    fetcher: Arc<F>,
    commands: mpsc::UnboundedReceiver<SchedulerCommand>,
    queue: RequestQueue,
    listeners: ListenerRegistry,
    in_flight: Option<FetchTask>,
    requests_active: bool,
    accepting: bool,
    completed: u64,
    failed: u64,
    cache_hits: u64,
}

impl<F: GuideFetcher> DownloadScheduler<F> {
    pub fn new(
        cache: Arc<CacheManager>,
        fetcher: Arc<F>,
        commands: mpsc::UnboundedReceiver<SchedulerCommand>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            commands,
            queue: RequestQueue::new(),
            listeners: ListenerRegistry::new(),
            in_flight: None,
            requests_active: false,
            accepting: true,
            completed: 0,
            failed: 0,
            cache_hits: 0,
        }
    }

    /// Spawn a scheduler on the current runtime
    ///
    /// The task ends after a `Shutdown` command, or once every sender is
    /// dropped, as soon as the in-flight fetch (if any) has been reported.
    pub fn spawn(
        cache: Arc<CacheManager>,
        fetcher: Arc<F>,
    ) -> (mpsc::UnboundedSender<SchedulerCommand>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self::new(cache, fetcher, rx);
        let handle = tokio::spawn(scheduler.run());
        (tx, handle)
    }

    /// Process commands and completions until shut down
    pub async fn run(mut self) {
        debug!("Download scheduler started");

        loop {
            tokio::select! {
                command = self.commands.recv(), if self.accepting => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("All scheduler handles dropped");
                        self.stop_accepting();
                    }
                },
                joined = join_in_flight(&mut self.in_flight), if self.in_flight.is_some() => {
                    if let Some(task) = self.in_flight.take() {
                        self.report_completion(joined, task).await;
                    }
                    if self.accepting {
                        self.start_next_request().await;
                    }
                }
            }

            if !self.accepting && self.in_flight.is_none() {
                break;
            }
        }

        debug!(
            "Download scheduler stopped after {} completed and {} failed fetches",
            self.completed, self.failed
        );
    }

    async fn handle_command(&mut self, command: SchedulerCommand) {
        match command {
            SchedulerCommand::Enqueue(request) => {
                self.queue.enqueue(request);
                if self.in_flight.is_none() {
                    self.start_next_request().await;
                }
            }
            SchedulerCommand::AddListener(id, listener) => {
                debug!("Registered {}", id);
                self.listeners.add(id, listener);
            }
            SchedulerCommand::RemoveListener(id) => {
                if self.listeners.remove(id) {
                    debug!("Unregistered {}", id);
                }
            }
            SchedulerCommand::Status(reply) => {
                let _ = reply.send(self.status());
            }
            SchedulerCommand::Shutdown => {
                info!("Download scheduler shutting down");
                self.stop_accepting();
            }
        }
    }

    fn stop_accepting(&mut self) {
        self.accepting = false;
        let dropped = self.queue.clear_pending();
        if dropped > 0 {
            info!("Dropped {} queued requests on shutdown", dropped);
        }
    }

    fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            queued: self.queue.len(),
            in_flight: self.queue.in_flight().map(|current| current.key()),
            requests_active: self.requests_active,
            listeners: self.listeners.len(),
            completed: self.completed,
            failed: self.failed,
            cache_hits: self.cache_hits,
        }
    }

    /// Drain loop: pop entries until one needs the network or the queue is empty
    async fn start_next_request(&mut self) {
        if self.in_flight.is_some() {
            return;
        }

        while let Some(request) = self.queue.pop() {
            if !request.refresh && is_cached(&request.data_file).await {
                debug!("{} already cached", request.key());
                self.cache_hits += 1;
                self.listeners
                    .notify(&NetworkEvent::DataAvailable(RequestEvent::from(&request)));
                continue;
            }

            self.queue.begin(&request);
            self.requests_active = true;
            self.listeners
                .notify(&NetworkEvent::RequestStarted(RequestEvent::from(&request)));

            let data_file = request.data_file.clone();
            let metadata_file = request.metadata_file.clone();
            let verbose = self.cache.config().debug;
            let handle = tokio::spawn(execute_request(
                Arc::clone(&self.fetcher),
                request,
                verbose,
            ));
            self.in_flight = Some(FetchTask {
                handle,
                data_file,
                metadata_file,
            });
            return;
        }

        if self.requests_active {
            self.requests_active = false;
            debug!("Request queue drained");
            self.listeners.notify(&NetworkEvent::RequestsFinished);
        }
    }

    /// Report a finished fetch once its files are in their final state
    async fn report_completion(
        &mut self,
        joined: Result<RequestInfo, JoinError>,
        task: FetchTask,
    ) {
        // The in-flight record carries any primary upgrade merged during the fetch
        let current = self.queue.finish();

        let (success, not_found) = match &joined {
            Ok(request) => (request.success, request.not_found),
            Err(e) => {
                warn!("Fetch task did not complete: {}", e);
                (false, false)
            }
        };
        if joined.is_err() {
            remove_cache_files(&task.data_file, &task.metadata_file).await;
        }

        let event = match (current, &joined) {
            (Some(current), _) => RequestEvent::from(current),
            (None, Ok(request)) => RequestEvent::from(request),
            (None, Err(_)) => return,
        };

        if success {
            self.completed += 1;
            self.listeners.notify(&NetworkEvent::DataAvailable(event));
        } else {
            self.failed += 1;
            self.listeners.notify(&NetworkEvent::RequestFailed {
                request: event,
                not_found,
            });
        }
    }
}

async fn is_cached(data_file: &Path) -> bool {
    fs::metadata(data_file)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

async fn join_in_flight(task: &mut Option<FetchTask>) -> Result<RequestInfo, JoinError> {
    match task {
        Some(task) => (&mut task.handle).await,
        None => std::future::pending().await,
    }
}
