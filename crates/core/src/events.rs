//! Best-effort seat-state change notifications (spec §9: "the core must
//! publish a `SeatStateChanged(showtimeId)` event after any primitive that
//! mutates seat state, but correctness does not depend on delivery").
//!
//! A `tokio::sync::broadcast` channel is the whole transport: no WebSocket
//! gateway is wired up in `cineslot-api` (out of scope per spec §1), but
//! anything in-process — a future realtime transport, a test assertion —
//! can subscribe.

use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatStateChanged {
    pub showtime_id: Uuid,
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SeatStateChanged>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(1024);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SeatStateChanged> {
        self.sender.subscribe()
    }

    /// Publishes the event. Dropped silently if there are no subscribers —
    /// a `SendError` here just means nobody is listening, which is exactly
    /// the "best-effort" the spec calls for.
    pub fn publish(&self, showtime_id: Uuid) {
        let _ = self.sender.send(SeatStateChanged { showtime_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(Uuid::new_v4());
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let showtime_id = Uuid::new_v4();
        bus.publish(showtime_id);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.showtime_id, showtime_id);
    }
}
