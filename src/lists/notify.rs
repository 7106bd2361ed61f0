//! Change Notification Module
//!
//! Broadcasts full list snapshots after every successful mutation so that
//! anything mirroring a list (badge counts, other views) stays in sync.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

use crate::lists::ListItem;

/// Buffered snapshots per subscriber before it starts lagging
const DEFAULT_BUS_CAPACITY: usize = 64;

// == List Change ==
/// A snapshot of one list after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ListChange {
    /// Storage key of the list that changed
    pub key: String,
    /// Full list contents after the change
    pub items: Vec<ListItem>,
}

// == Change Bus ==
/// Process-wide publisher of list snapshots.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ListChange>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a snapshot. Having no subscribers is fine.
    pub fn publish(&self, key: &str, items: &[ListItem]) {
        let change = ListChange {
            key: key.to_string(),
            items: items.to_vec(),
        };

        match self.sender.send(change) {
            Ok(receivers) => debug!("Published '{}' snapshot to {} observers", key, receivers),
            Err(_) => debug!("Published '{}' snapshot with no observers", key),
        }
    }

    /// Receives every change on every key.
    pub fn subscribe(&self) -> broadcast::Receiver<ListChange> {
        self.sender.subscribe()
    }

    /// Receives changes for one storage key only.
    pub fn watch(&self, key: impl Into<String>) -> ListWatcher {
        ListWatcher {
            key: key.into(),
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

// == List Watcher ==
/// Subscription filtered down to a single list.
#[derive(Debug)]
pub struct ListWatcher {
    key: String,
    receiver: broadcast::Receiver<ListChange>,
}

impl ListWatcher {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits for the next snapshot of this list. `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<Vec<ListItem>> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.key == self.key => return Some(change.items),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Watcher on '{}' lagged, skipped {} snapshots", self.key, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the most recent pending snapshot without waiting.
    pub fn latest(&mut self) -> Option<Vec<ListItem>> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(change) if change.key == self.key => latest = Some(change.items),
                Ok(_) => {}
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return latest,
            }
        }
    }
}
