//! Core request queue implementation
//!
//! The queue is a plain value owned by the scheduler task, so it needs no
//! locking: every mutation happens on that task.

use std::collections::VecDeque;

use tracing::debug;

use super::types::{EnqueueOutcome, InFlightRequest, RequestInfo};

/// Ordered, deduplicating queue of fetch requests plus the in-flight slot
///
/// At most one entry exists across the pending queue and the in-flight slot
/// for any (channel, date).
#[derive(Debug, Default)]
pub struct RequestQueue {
    /// Waiting requests in arrival order
    pending: VecDeque<RequestInfo>,
    /// Request currently being fetched
    in_flight: Option<InFlightRequest>,
}

impl RequestQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request, merging it into an existing entry for the same key
    ///
    /// When merging, the existing entry becomes primary if the new request
    /// names its date as primary, and becomes a refresh if the new request
    /// is one.
    pub fn enqueue(&mut self, request: RequestInfo) -> EnqueueOutcome {
        let primary = request.is_primary();

        if let Some(existing) = self
            .pending
            .iter_mut()
            .find(|entry| entry.matches(&request.channel.id, request.date))
        {
            let upgraded = primary && !existing.is_primary();
            if primary {
                existing.primary_date = existing.date;
            }
            existing.refresh |= request.refresh;
            debug!("Merged duplicate request {} into queue", request.key());
            return EnqueueOutcome::MergedPending { upgraded };
        }

        if let Some(current) = self
            .in_flight
            .as_mut()
            .filter(|current| current.matches(&request.channel.id, request.date))
        {
            let upgraded = primary && current.primary_date != current.date;
            if primary {
                current.primary_date = current.date;
            }
            debug!("Merged duplicate request {} into in-flight fetch", request.key());
            return EnqueueOutcome::MergedInFlight { upgraded };
        }

        debug!("Queued request {}", request.key());
        self.pending.push_back(request);
        EnqueueOutcome::Queued
    }

    /// Remove and return the head of the queue
    pub fn pop(&mut self) -> Option<RequestInfo> {
        self.pending.pop_front()
    }

    /// Record a popped request as the one being fetched
    pub fn begin(&mut self, request: &RequestInfo) {
        self.in_flight = Some(InFlightRequest::from(request));
    }

    /// Clear the in-flight slot, returning what it held
    pub fn finish(&mut self) -> Option<InFlightRequest> {
        self.in_flight.take()
    }

    /// The request currently being fetched
    pub fn in_flight(&self) -> Option<&InFlightRequest> {
        self.in_flight.as_ref()
    }

    /// Whether a fetch is in progress
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of waiting requests
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no requests are waiting
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Waiting requests in order
    pub fn iter(&self) -> impl Iterator<Item = &RequestInfo> {
        self.pending.iter()
    }

    /// Drop all waiting requests, returning how many were dropped
    pub fn clear_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}
