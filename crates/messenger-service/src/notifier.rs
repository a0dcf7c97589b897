//! In-process event fan-out
//!
//! Used when Redis is not configured. Every subscriber sees events in the
//! order this process published them; lagging subscribers lose the oldest.

use async_trait::async_trait;
use messenger_core::traits::{EventNotifier, RepoResult};
use messenger_core::{DomainEvent, EventEnvelope};
use tokio::sync::broadcast;
use tracing::trace;

/// Default channel depth
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<EventEnvelope>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl EventNotifier for BroadcastNotifier {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        // No subscribers is not a failure
        if let Ok(receivers) = self.sender.send(event.envelope()) {
            trace!(kind = event.kind(), receivers, "event broadcast");
        }
        Ok(())
    }
}
