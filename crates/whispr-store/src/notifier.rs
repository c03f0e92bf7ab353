use whispr_types::events::GatewayEvent;

/// Fan-out of change events to whoever is watching. Best effort: no delivery
/// guarantee and no backlog.
pub trait Notifier: Send + Sync {
    fn publish(&self, event: GatewayEvent);
}

/// Used by the single-user local store, which has no observers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn publish(&self, _event: GatewayEvent) {}
}

impl Notifier for tokio::sync::broadcast::Sender<GatewayEvent> {
    fn publish(&self, event: GatewayEvent) {
        // No receivers is not an error
        let _ = self.send(event);
    }
}
