//! Unit tests for queue module components
//!
//! These tests cover deduplication, primary-date merging and FIFO order of
//! the request queue in isolation from the scheduler.

#[cfg(test)]
mod queue_tests {
    use super::super::*;
    use crate::app::models::Channel;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::sync::Arc;
    use url::Url;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(channel: &Arc<Channel>, day: NaiveDate, primary: NaiveDate) -> RequestInfo {
        let name = format!("{}_{}", channel.id, day);
        RequestInfo::new(
            Arc::clone(channel),
            day,
            primary,
            Url::parse(&format!("http://guide.test/{}.xml.gz", name)).unwrap(),
            PathBuf::from(format!("/tmp/{}.xml.gz", name)),
            PathBuf::from(format!("/tmp/{}.cache", name)),
        )
    }

    #[test]
    fn test_duplicate_primary_then_secondary_stays_primary() {
        let chan_a = Arc::new(Channel::new("chanA", ["http://guide.test/"]));
        let day = date(2021, 6, 1);
        let mut queue = RequestQueue::new();

        assert_eq!(queue.enqueue(request(&chan_a, day, day)), EnqueueOutcome::Queued);
        assert_eq!(
            queue.enqueue(request(&chan_a, day, date(2021, 5, 31))),
            EnqueueOutcome::MergedPending { upgraded: false }
        );

        assert_eq!(queue.len(), 1);
        let head = queue.pop().unwrap();
        assert!(head.is_primary());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_duplicate_secondary_then_primary_upgrades() {
        let chan_a = Arc::new(Channel::new("chanA", ["http://guide.test/"]));
        let day = date(2021, 6, 2);
        let mut queue = RequestQueue::new();

        queue.enqueue(request(&chan_a, day, date(2021, 6, 1)));
        assert_eq!(
            queue.enqueue(request(&chan_a, day, day)),
            EnqueueOutcome::MergedPending { upgraded: true }
        );

        let head = queue.pop().unwrap();
        assert_eq!(head.primary_date, day);
    }

    #[test]
    fn test_two_secondaries_stay_secondary() {
        let chan_a = Arc::new(Channel::new("chanA", ["http://guide.test/"]));
        let day = date(2021, 6, 2);
        let mut queue = RequestQueue::new();

        queue.enqueue(request(&chan_a, day, date(2021, 6, 1)));
        queue.enqueue(request(&chan_a, day, date(2021, 6, 1)));

        assert_eq!(queue.len(), 1);
        assert!(!queue.pop().unwrap().is_primary());
    }

    #[test]
    fn test_merges_into_in_flight_request() {
        let chan_a = Arc::new(Channel::new("chanA", ["http://guide.test/"]));
        let day = date(2021, 6, 2);
        let mut queue = RequestQueue::new();

        queue.enqueue(request(&chan_a, day, date(2021, 6, 1)));
        let head = queue.pop().unwrap();
        queue.begin(&head);
        assert!(queue.is_fetching());

        assert_eq!(
            queue.enqueue(request(&chan_a, day, day)),
            EnqueueOutcome::MergedInFlight { upgraded: true }
        );
        assert!(queue.is_empty());

        let finished = queue.finish().unwrap();
        assert_eq!(finished.primary_date, day);
        assert!(!queue.is_fetching());

        // Once finished, the same key may be queued again
        assert!(queue.enqueue(request(&chan_a, day, day)).is_queued());
    }

    #[test]
    fn test_fifo_order_and_distinct_keys() {
        let chan_a = Arc::new(Channel::new("chanA", ["http://guide.test/"]));
        let chan_b = Arc::new(Channel::new("chanB", ["http://guide.test/"]));
        let mut queue = RequestQueue::new();

        let d1 = date(2021, 6, 1);
        let d2 = date(2021, 6, 2);
        queue.enqueue(request(&chan_a, d1, d1));
        queue.enqueue(request(&chan_b, d1, d1));
        queue.enqueue(request(&chan_a, d2, d1));
        queue.enqueue(request(&chan_b, d1, d1));

        let order: Vec<String> = queue.iter().map(|r| r.key().to_string()).collect();
        assert_eq!(
            order,
            vec!["chanA_2021-06-01", "chanB_2021-06-01", "chanA_2021-06-02"]
        );
        assert_eq!(queue.pop().unwrap().key().to_string(), "chanA_2021-06-01");
        assert_eq!(queue.clear_pending(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_refresh_flag_is_merged() {
        let chan_a = Arc::new(Channel::new("chanA", ["http://guide.test/"]));
        let day = date(2021, 6, 1);
        let mut queue = RequestQueue::new();

        queue.enqueue(request(&chan_a, day, day));
        queue.enqueue(request(&chan_a, day, day).with_refresh(true));

        assert!(queue.pop().unwrap().refresh);
    }
}
