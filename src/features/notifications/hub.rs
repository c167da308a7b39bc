use tokio::sync::broadcast;
use uuid::Uuid;

use crate::features::notifications::models::OutboundMessage;

/// One realtime event: a message addressed to a set of recipients
#[derive(Debug, Clone)]
pub struct RealtimeEvent {
    pub recipients: Vec<Uuid>,
    pub message: OutboundMessage,
}

impl RealtimeEvent {
    pub fn is_for(&self, user_id: Uuid) -> bool {
        self.recipients.contains(&user_id)
    }
}

/// In-process fan-out channel for realtime delivery.
///
/// Last-write-wins, no ordering or delivery guarantee: slow subscribers
/// drop lagged events and a hub with no subscribers drops everything.
#[derive(Debug, Clone)]
pub struct RealtimeHub {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to every current subscriber; returns how many received it
    pub fn publish(&self, recipients: Vec<Uuid>, message: OutboundMessage) -> usize {
        match self.tx.send(RealtimeEvent {
            recipients,
            message,
        }) {
            Ok(subscribers) => subscribers,
            // No subscribers connected; nothing to deliver
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new(256)
    }
}
