//! Tests for the download scheduler


use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::TempDir;
use tokio::sync::{mpsc, oneshot};
use url::Url;

use super::*;
use crate::app::cache::{CacheConfig, CacheManager};
use crate::app::models::{Channel, ChannelDateKey};
use crate::app::queue::RequestInfo;
use mock::{MockFetcher, MockResponse};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, d).unwrap()
}

fn key(id: &str, d: u32) -> ChannelDateKey {
    ChannelDateKey::new(id, day(d))
}

struct Harness {
    _temp_dir: TempDir,
    cache: Arc<CacheManager>,
    fetcher: Arc<MockFetcher>,
    commands: mpsc::UnboundedSender<SchedulerCommand>,
    handle: tokio::task::JoinHandle<()>,
    events: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl Harness {
    fn new(fetcher: MockFetcher) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let cache = Arc::new(CacheManager::new(CacheConfig::with_cache_root(
            temp_dir.path().to_path_buf(),
        )));
        let fetcher = Arc::new(fetcher);
        let (commands, handle) = DownloadScheduler::spawn(Arc::clone(&cache), Arc::clone(&fetcher));

        let (tx, events) = mpsc::unbounded_channel();
        commands
            .send(SchedulerCommand::AddListener(
                ListenerId(0),
                Arc::new(EventForwarder(tx)),
            ))
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            cache,
            fetcher,
            commands,
            handle,
            events,
        }
    }

    fn request(&self, id: &str, date: u32, primary: u32) -> RequestInfo {
        let channel = Arc::new(Channel::new(id, ["http://guide.test/"]));
        RequestInfo::new(
            channel,
            day(date),
            day(primary),
            Url::parse("http://guide.test/file.xml.gz").unwrap(),
            self.cache.data_file(id, day(date)).unwrap(),
            self.cache.metadata_file(id, day(date)).unwrap(),
        )
    }

    fn enqueue(&self, request: RequestInfo) {
        self.commands
            .send(SchedulerCommand::Enqueue(request))
            .unwrap();
    }

    async fn status(&self) -> SchedulerStatus {
        let (tx, rx) = oneshot::channel();
        self.commands.send(SchedulerCommand::Status(tx)).unwrap();
        rx.await.unwrap()
    }

    /// Collect events up to and including the next `RequestsFinished`
    async fn until_finished(&mut self) -> Vec<NetworkEvent> {
        let mut seen = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), self.events.recv())
                .await
                .expect("timed out waiting for events")
                .expect("event channel closed");
            let done = event == NetworkEvent::RequestsFinished;
            seen.push(event);
            if done {
                return seen;
            }
        }
    }
}

fn summarize(events: &[NetworkEvent]) -> Vec<String> {
    events.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_requests_are_fetched_one_at_a_time_in_order() {
    let mut harness = Harness::new(MockFetcher::new());

    harness.enqueue(harness.request("abc", 1, 1));
    harness.enqueue(harness.request("abc", 2, 1));
    harness.enqueue(harness.request("sbs", 1, 1));

    let events = harness.until_finished().await;
    assert_eq!(
        summarize(&events),
        vec![
            "started abc_2021-06-01",
            "available abc_2021-06-01",
            "started abc_2021-06-02",
            "available abc_2021-06-02",
            "started sbs_2021-06-01",
            "available sbs_2021-06-01",
            "requests finished",
        ]
    );
    assert_eq!(harness.fetcher.max_active(), 1);
    assert!(harness.cache.data_file("sbs", day(1)).unwrap().is_file());

    let status = harness.status().await;
    assert_eq!(status.completed, 3);
    assert!(!status.requests_active);
    assert!(status.in_flight.is_none());
}

#[tokio::test]
async fn test_duplicate_of_in_flight_request_is_fetched_once() {
    let (fetcher, gate) = MockFetcher::gated();
    let mut harness = Harness::new(fetcher);

    harness.enqueue(harness.request("abc", 1, 1));
    harness.enqueue(harness.request("abc", 1, 1));
    harness.enqueue(harness.request("abc", 1, 1));

    let status = harness.status().await;
    assert_eq!(status.in_flight, Some(key("abc", 1)));
    assert_eq!(status.queued, 0);

    gate.add_permits(10);
    let events = harness.until_finished().await;
    assert_eq!(events.len(), 3);
    assert_eq!(harness.fetcher.calls(), vec![key("abc", 1)]);
}

#[tokio::test]
async fn test_cached_entry_is_available_without_fetch() {
    let (fetcher, gate) = MockFetcher::gated();
    let mut harness = Harness::new(fetcher);
    std::fs::write(harness.cache.data_file("abc", day(2)).unwrap(), b"cached").unwrap();

    harness.enqueue(harness.request("abc", 1, 1));
    harness.enqueue(harness.request("abc", 2, 1));
    assert_eq!(harness.status().await.queued, 1);

    gate.add_permits(10);
    let events = harness.until_finished().await;
    assert_eq!(
        summarize(&events),
        vec![
            "started abc_2021-06-01",
            "available abc_2021-06-01",
            "available abc_2021-06-02",
            "requests finished",
        ]
    );
    assert_eq!(harness.fetcher.calls(), vec![key("abc", 1)]);
    assert_eq!(harness.status().await.cache_hits, 1);
}

#[tokio::test]
async fn test_refresh_bypasses_cached_entry() {
    let mut harness = Harness::new(MockFetcher::new());
    std::fs::write(harness.cache.data_file("abc", day(1)).unwrap(), b"old").unwrap();

    harness.enqueue(harness.request("abc", 1, 1).with_refresh(true));
    harness.until_finished().await;

    assert_eq!(harness.fetcher.calls(), vec![key("abc", 1)]);
    assert_eq!(
        std::fs::read(harness.cache.data_file("abc", day(1)).unwrap()).unwrap(),
        b"guide"
    );
}

#[tokio::test]
async fn test_failure_removes_cache_files() {
    let fetcher = MockFetcher::new();
    fetcher.respond(key("abc", 1), MockResponse::Fail);
    fetcher.respond(key("abc", 2), MockResponse::NotFound);
    let mut harness = Harness::new(fetcher);

    let data_file = harness.cache.data_file("abc", day(1)).unwrap();
    let metadata_file = harness.cache.metadata_file("abc", day(1)).unwrap();
    std::fs::write(&data_file, b"stale").unwrap();
    std::fs::write(&metadata_file, b"{}").unwrap();

    harness.enqueue(harness.request("abc", 1, 1).with_refresh(true));
    harness.enqueue(harness.request("abc", 2, 1));

    let events = harness.until_finished().await;
    assert_eq!(
        summarize(&events),
        vec![
            "started abc_2021-06-01",
            "failed abc_2021-06-01",
            "started abc_2021-06-02",
            "not found abc_2021-06-02",
            "requests finished",
        ]
    );
    assert!(!data_file.exists());
    assert!(!metadata_file.exists());
    assert!(!harness.cache.data_file("abc", day(2)).unwrap().exists());

    let secondary = events[3].request().unwrap();
    assert!(!secondary.is_primary());
    assert_eq!(harness.status().await.failed, 2);
}

#[tokio::test]
async fn test_panicked_fetch_is_cleaned_up_before_failure_is_reported() {
    let fetcher = MockFetcher::new();
    fetcher.respond(key("abc", 1), MockResponse::Panic);
    let mut harness = Harness::new(fetcher);
    let data_file = harness.cache.data_file("abc", day(1)).unwrap();
    let metadata_file = harness.cache.metadata_file("abc", day(1)).unwrap();

    harness.enqueue(harness.request("abc", 1, 1));

    let mut failed = false;
    while !failed {
        let event = tokio::time::timeout(Duration::from_secs(5), harness.events.recv())
            .await
            .expect("timed out waiting for events")
            .expect("event channel closed");
        if let NetworkEvent::RequestFailed { not_found, .. } = event {
            assert!(!not_found);
            // Files are gone by the time listeners hear about the failure
            assert!(!data_file.exists());
            assert!(!metadata_file.exists());
            failed = true;
        }
    }

    let status = harness.status().await;
    assert_eq!(status.failed, 1);
    assert!(status.in_flight.is_none());
}

#[tokio::test]
async fn test_in_flight_request_upgraded_to_primary() {
    let (fetcher, gate) = MockFetcher::gated();
    fetcher.respond(key("abc", 2), MockResponse::Fail);
    let mut harness = Harness::new(fetcher);

    // Secondary half of a window anchored on the 1st, then a direct request
    harness.enqueue(harness.request("abc", 2, 1));
    harness.enqueue(harness.request("abc", 2, 2));
    harness.status().await;

    gate.add_permits(10);
    let events = harness.until_finished().await;

    let started = events[0].request().unwrap();
    assert_eq!(started.primary_date, day(1));
    match &events[1] {
        NetworkEvent::RequestFailed { request, not_found } => {
            assert_eq!(request.primary_date, day(2));
            assert!(request.is_primary());
            assert!(!not_found);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(harness.fetcher.calls().len(), 1);
}

#[tokio::test]
async fn test_requests_finished_once_per_active_period() {
    let mut harness = Harness::new(MockFetcher::new());

    harness.enqueue(harness.request("abc", 1, 1));
    harness.until_finished().await;

    // A cache hit on an idle scheduler does not start a new active period
    harness.enqueue(harness.request("abc", 1, 1));
    let event = tokio::time::timeout(Duration::from_secs(5), harness.events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.to_string(), "available abc_2021-06-01");
    harness.status().await;
    assert!(harness.events.try_recv().is_err());

    harness.enqueue(harness.request("abc", 3, 3));
    let events = harness.until_finished().await;
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn test_removed_listener_receives_nothing() {
    let mut harness = Harness::new(MockFetcher::new());
    let (tx, mut removed) = mpsc::unbounded_channel();
    harness
        .commands
        .send(SchedulerCommand::AddListener(
            ListenerId(7),
            Arc::new(EventForwarder(tx)),
        ))
        .unwrap();
    assert_eq!(harness.status().await.listeners, 2);

    harness
        .commands
        .send(SchedulerCommand::RemoveListener(ListenerId(7)))
        .unwrap();
    harness.enqueue(harness.request("abc", 1, 1));
    harness.until_finished().await;

    assert!(removed.try_recv().is_err());
    assert_eq!(harness.status().await.listeners, 1);
}

#[tokio::test]
async fn test_validators_persist_between_fetches() {
    let fetcher = MockFetcher::new();
    fetcher.respond(
        key("abc", 1),
        MockResponse::Data(b"guide".to_vec(), Some("\"m1\"")),
    );
    let mut harness = Harness::new(fetcher);

    harness.enqueue(harness.request("abc", 1, 1));
    harness.until_finished().await;
    let metadata_file = harness.cache.metadata_file("abc", day(1)).unwrap();
    assert!(metadata_file.is_file());

    harness.fetcher.respond(key("abc", 1), MockResponse::NotModified);
    harness.enqueue(harness.request("abc", 1, 1).with_refresh(true));
    harness.until_finished().await;

    let received = harness.fetcher.received_validators();
    assert_eq!(received.len(), 2);
    assert!(received[0].is_empty());
    assert_eq!(received[1].etag.as_deref(), Some("\"m1\""));
    assert_eq!(
        std::fs::read(harness.cache.data_file("abc", day(1)).unwrap()).unwrap(),
        b"guide"
    );
}

#[tokio::test]
async fn test_shutdown_finishes_in_flight_and_drops_queue() {
    let (fetcher, gate) = MockFetcher::gated();
    let harness = Harness::new(fetcher);

    harness.enqueue(harness.request("abc", 1, 1));
    harness.enqueue(harness.request("abc", 2, 2));
    assert_eq!(harness.status().await.queued, 1);

    harness.commands.send(SchedulerCommand::Shutdown).unwrap();
    gate.add_permits(10);
    tokio::time::timeout(Duration::from_secs(5), harness.handle)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(harness.fetcher.calls(), vec![key("abc", 1)]);
    assert!(harness.cache.data_file("abc", day(1)).unwrap().is_file());
    assert!(!harness.cache.data_file("abc", day(2)).unwrap().exists());
}
