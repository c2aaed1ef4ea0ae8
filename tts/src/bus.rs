use crate::NarrationEvent;
use tokio::sync::broadcast;

/// Broadcast channel carrying one controller's [`NarrationEvent`]s.
#[derive(Clone)]
pub struct NarrationBus {
    tx: broadcast::Sender<NarrationEvent>,
}

impl NarrationBus {
    /// Default broadcast capacity. Word events are small and frequent.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a new bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to the stream.
    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all subscribers. Having none is not an error.
    pub fn publish(&self, event: NarrationEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for NarrationBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
