//! Single-flight download scheduler and listener fan-out
//!
//! Requests flow from [`SchedulerCommand::Enqueue`] into the request queue,
//! are fetched one at a time through a [`GuideFetcher`](crate::app::client::GuideFetcher),
//! and every state transition is reported to the registered listeners as a
//! [`NetworkEvent`]:
//!
//! ```text
//! enqueue -> RequestStarted -> DataAvailable | RequestFailed -> ... -> RequestsFinished
//! ```
//!
//! Entries whose data file already exists when they reach the head of the
//! queue produce `DataAvailable` without a network round trip.

pub mod core;
pub mod events;
pub mod listeners;
pub mod task;

#[cfg(test)]
pub(crate) mod tests;

pub use core::{DownloadScheduler, SchedulerCommand, SchedulerStatus};
pub use events::{NetworkEvent, RequestEvent};
pub use listeners::{EventForwarder, ListenerId, ListenerRegistry, NetworkListener};
