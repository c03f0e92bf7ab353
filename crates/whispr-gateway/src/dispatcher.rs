use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;
use tracing::trace;

use whispr_store::notifier::Notifier;
use whispr_types::events::GatewayEvent;

/// Events buffered per observer before a slow one starts skipping.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Fans content events out to every connected observer.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Every observer receives every event
    broadcast_tx: broadcast::Sender<GatewayEvent>,

    observers: AtomicUsize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                observers: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to gateway events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected observers.
    pub fn broadcast(&self, event: GatewayEvent) {
        trace!("Broadcasting {}", event.type_name());
        let _ = self.inner.broadcast_tx.send(event);
    }

    pub fn observer_connected(&self) -> usize {
        self.inner.observers.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn observer_disconnected(&self) -> usize {
        self.inner
            .observers
            .fetch_sub(1, Ordering::AcqRel)
            .saturating_sub(1)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.load(Ordering::Acquire)
    }
}

impl Notifier for Dispatcher {
    fn publish(&self, event: GatewayEvent) {
        self.broadcast(event);
    }
}
