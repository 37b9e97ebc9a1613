use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dto::wire::WireUpdate;

/// An applied update together with the peer that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubEvent {
    /// WebSocket peer the mutation came from; `None` for REST calls and clocks.
    pub origin: Option<Uuid>,
    /// Field value after the mutation.
    pub update: WireUpdate,
}

/// Fan-out of applied updates to every WebSocket peer and SSE viewer.
pub struct UpdateHub {
    sender: broadcast::Sender<HubEvent>,
}

impl UpdateHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent updates.
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.sender.subscribe()
    }

    /// Send an update to all current subscribers, ignoring the no-subscriber case.
    pub fn broadcast(&self, origin: Option<Uuid>, update: WireUpdate) {
        let _ = self.sender.send(HubEvent { origin, update });
    }
}
