//! Listener registration and fan-out
//!
//! Listeners are invoked on the scheduler task, one at a time, in
//! registration order. A listener must not block; forward the event to a
//! channel (see [`EventForwarder`]) if it needs to do real work.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use super::events::NetworkEvent;

/// Observer of scheduler state transitions
pub trait NetworkListener: Send + Sync {
    fn on_event(&self, event: &NetworkEvent);
}

impl<F> NetworkListener for F
where
    F: Fn(&NetworkEvent) + Send + Sync,
{
    fn on_event(&self, event: &NetworkEvent) {
        self(event)
    }
}

/// Listener that forwards every event into an unbounded channel
#[derive(Debug, Clone)]
pub struct EventForwarder(pub mpsc::UnboundedSender<NetworkEvent>);

impl NetworkListener for EventForwarder {
    fn on_event(&self, event: &NetworkEvent) {
        // A closed receiver just means nobody is watching any more
        let _ = self.0.send(event.clone());
    }
}

/// Handle returned when a listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Registered listeners in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(ListenerId, Arc<dyn NetworkListener>)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; registering an id twice replaces the first
    pub fn add(&mut self, id: ListenerId, listener: Arc<dyn NetworkListener>) {
        if let Some(slot) = self.listeners.iter_mut().find(|(existing, _)| *existing == id) {
            slot.1 = listener;
        } else {
            self.listeners.push((id, listener));
        }
    }

    /// Unregister a listener; returns whether it was registered
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener
    pub fn notify(&self, event: &NetworkEvent) {
        trace!("Notifying {} listeners: {}", self.listeners.len(), event);
        for (_, listener) in &self.listeners {
            listener.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field(
                "listeners",
                &self.listeners.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            )
            .finish()
    }
}
