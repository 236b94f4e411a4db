//! Lifecycle notifications
//!
//! Subscribers receive every event published after they subscribe. A
//! [`Subscription`] is the cancellable handle: dropping it or calling
//! [`Subscription::cancel`] detaches it from the bus.

use crate::ledger::Receipt;
use crate::multisig::record::TxType;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Maximum number of events to buffer per subscriber
const EVENT_CAPACITY: usize = 256;

/// Events published by the engine
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum EngineEvent {
    /// A new record was submitted
    Submitted { id: u64, tx_type: TxType },
    /// An owner confirmation was newly recorded
    Confirmed {
        id: u64,
        owner: String,
        confirmations: usize,
        quorum_reached: bool,
    },
    /// The ledger applied the record
    Executed { id: u64, receipt: Receipt },
    /// A ledger apply failed; the record stays executable
    ExecutionFailed {
        id: u64,
        error: String,
        retryable: bool,
    },
}

/// Fan-out of engine events
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Create a new bus
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Publish an event to all current subscribers
    pub fn publish(&self, event: EngineEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to an event stream
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<EngineEvent>,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// Returns `None` once the bus is gone. A subscriber that falls more than
    /// the buffer behind skips the missed events and keeps going.
    pub async fn next(&mut self) -> Option<EngineEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    log::warn!("Event subscriber lagged, skipped {} events", missed);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_next(&mut self) -> Option<EngineEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    log::warn!("Event subscriber lagged, skipped {} events", missed);
                }
                Err(_) => return None,
            }
        }
    }

    /// Stop receiving events
    pub fn cancel(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_creation() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_with_no_subscribers() {
        let bus = EventBus::new();
        // Should not panic even with no subscribers
        bus.publish(EngineEvent::Submitted {
            id: 1,
            tx_type: TxType::Burn,
        });
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();

        bus.publish(EngineEvent::Submitted {
            id: 1,
            tx_type: TxType::Mint,
        });
        bus.publish(EngineEvent::Confirmed {
            id: 1,
            owner: "O1".to_string(),
            confirmations: 1,
            quorum_reached: false,
        });

        assert!(matches!(sub.next().await, Some(EngineEvent::Submitted { id: 1, .. })));
        assert!(matches!(sub.next().await, Some(EngineEvent::Confirmed { id: 1, .. })));
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn test_cancel_detaches_subscriber() {
        let bus = EventBus::new();
        let sub = bus.subscribe();
        let _other = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        sub.cancel();
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_closed_bus_ends_stream() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        drop(bus);

        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn test_event_serialization() {
        let event = EngineEvent::Submitted {
            id: 3,
            tx_type: TxType::Burn,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("Submitted"));
        assert!(json.contains("Burn"));
    }
}
