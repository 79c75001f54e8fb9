//! Events delivered to network listeners

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::app::models::{Channel, ChannelDateKey};
use crate::app::queue::{InFlightRequest, RequestInfo};

/// The (channel, date, primary date) triple every request event carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEvent {
    pub channel: Arc<Channel>,
    pub date: NaiveDate,
    /// Anchor date of the window the request belongs to
    pub primary_date: NaiveDate,
}

impl RequestEvent {
    /// Whether a failure for this request should be shown to the user
    pub fn is_primary(&self) -> bool {
        self.date == self.primary_date
    }

    pub fn key(&self) -> ChannelDateKey {
        ChannelDateKey::new(self.channel.id.clone(), self.date)
    }
}

impl From<&RequestInfo> for RequestEvent {
    fn from(request: &RequestInfo) -> Self {
        Self {
            channel: Arc::clone(&request.channel),
            date: request.date,
            primary_date: request.primary_date,
        }
    }
}

impl From<InFlightRequest> for RequestEvent {
    fn from(request: InFlightRequest) -> Self {
        Self {
            channel: request.channel,
            date: request.date,
            primary_date: request.primary_date,
        }
    }
}

/// State transitions reported by the download scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// A network fetch was dispatched
    RequestStarted(RequestEvent),
    /// Data for the channel and date is in the cache
    DataAvailable(RequestEvent),
    /// The fetch failed; both cache files for the key were removed
    RequestFailed {
        request: RequestEvent,
        /// The server answered 404
        not_found: bool,
    },
    /// The queue drained after a period of activity
    RequestsFinished,
}

impl NetworkEvent {
    /// The request this event concerns, if any
    pub fn request(&self) -> Option<&RequestEvent> {
        match self {
            NetworkEvent::RequestStarted(request) | NetworkEvent::DataAvailable(request) => {
                Some(request)
            }
            NetworkEvent::RequestFailed { request, .. } => Some(request),
            NetworkEvent::RequestsFinished => None,
        }
    }
}

impl fmt::Display for NetworkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkEvent::RequestStarted(r) => write!(f, "started {}", r.key()),
            NetworkEvent::DataAvailable(r) => write!(f, "available {}", r.key()),
            NetworkEvent::RequestFailed { request, not_found } => {
                if *not_found {
                    write!(f, "not found {}", request.key())
                } else {
                    write!(f, "failed {}", request.key())
                }
            }
            NetworkEvent::RequestsFinished => write!(f, "requests finished"),
        }
    }
}
