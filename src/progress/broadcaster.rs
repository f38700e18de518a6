//! Observer registry.
//!
//! Each observer gets a bounded channel; the WebSocket handler forwards it to
//! the socket. Delivery is best effort: a full or closed channel counts as a
//! failed send for that observer only. Observers are removed by their own
//! disconnect path, never by a failed broadcast.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use super::ProgressEvent;

const OBSERVER_BUFFER: usize = 64;

pub type ObserverId = u64;

pub struct ProgressBroadcaster {
    observers: RwLock<HashMap<ObserverId, mpsc::Sender<ProgressEvent>>>,
    next_id: AtomicU64,
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBroadcaster {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new observer.
    ///
    /// Returns its id and the receiver for events addressed to it.
    pub async fn register(&self) -> (ObserverId, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(OBSERVER_BUFFER);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.write().await.insert(id, tx);
        debug!("Observer {} registered", id);
        (id, rx)
    }

    pub async fn unregister(&self, id: ObserverId) {
        if self.observers.write().await.remove(&id).is_some() {
            debug!("Observer {} unregistered", id);
        }
    }

    /// Deliver `event` to every registered observer.
    ///
    /// Returns the ids the event could not be delivered to.
    pub async fn broadcast(&self, event: &ProgressEvent) -> Vec<ObserverId> {
        let observers = self.observers.read().await;
        let mut failed = Vec::new();

        for (id, sender) in observers.iter() {
            if let Err(e) = sender.try_send(event.clone()) {
                warn!("Error sending update to observer {}: {}", id, e);
                failed.push(*id);
            }
        }

        failed
    }

    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_broadcast() {
        let broadcaster = ProgressBroadcaster::new();
        let (_, mut rx1) = broadcaster.register().await;
        let (_, mut rx2) = broadcaster.register().await;

        let event = ProgressEvent::current(0);
        assert!(broadcaster.broadcast(&event).await.is_empty());

        assert_eq!(rx1.recv().await, Some(event.clone()));
        assert_eq!(rx2.recv().await, Some(event));
    }

    #[tokio::test]
    async fn test_failed_observer_does_not_block_others() {
        let broadcaster = ProgressBroadcaster::new();
        let (_, mut rx1) = broadcaster.register().await;
        let (dead, rx_dead) = broadcaster.register().await;
        let (_, mut rx3) = broadcaster.register().await;
        drop(rx_dead);

        let event = ProgressEvent::completed(0, "done");
        let failed = broadcaster.broadcast(&event).await;

        assert_eq!(failed, vec![dead]);
        assert_eq!(rx1.recv().await, Some(event.clone()));
        assert_eq!(rx3.recv().await, Some(event));
        // Removal is left to the observer's own disconnect path.
        assert_eq!(broadcaster.observer_count().await, 3);
    }

    #[tokio::test]
    async fn test_full_observer_counts_as_failure() {
        let broadcaster = ProgressBroadcaster::new();
        let (slow, _rx_slow) = broadcaster.register().await;

        for i in 0..OBSERVER_BUFFER {
            assert!(broadcaster.broadcast(&ProgressEvent::current(i)).await.is_empty());
        }
        let failed = broadcaster.broadcast(&ProgressEvent::current(0)).await;
        assert_eq!(failed, vec![slow]);
    }

    #[tokio::test]
    async fn test_unregister() {
        let broadcaster = ProgressBroadcaster::new();
        let (id, _rx) = broadcaster.register().await;
        assert_eq!(broadcaster.observer_count().await, 1);

        broadcaster.unregister(id).await;
        assert_eq!(broadcaster.observer_count().await, 0);

        // Unknown ids are ignored.
        broadcaster.unregister(id).await;
    }

    #[tokio::test]
    async fn test_broadcast_without_observers() {
        let broadcaster = ProgressBroadcaster::new();
        assert!(broadcaster
            .broadcast(&ProgressEvent::current(0))
            .await
            .is_empty());
    }
}
