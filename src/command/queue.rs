//! Pending command queue

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tello_bridge_shared::CommandRequest;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

/// A request together with its position ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCommand {
    pub ticket: u64,
    pub request: CommandRequest,
}

/// FIFO of commands waiting for the executor
///
/// The head stays queued while it executes, so it keeps showing as busy
/// and a resubmission of its id is still dropped.
pub struct CommandQueue {
    entries: Mutex<VecDeque<QueuedCommand>>,
    next_ticket: AtomicU64,
    notify: Notify,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            next_ticket: AtomicU64::new(0),
            notify: Notify::new(),
        }
    }

    fn next_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst)
    }

    /// Append a request unless its id is already pending
    ///
    /// Returns false when the request was dropped as a duplicate.
    pub async fn submit(&self, request: CommandRequest) -> bool {
        let mut entries = self.entries.lock().await;

        if request.is_tracked() && entries.iter().any(|e| e.request.id == request.id) {
            debug!("Dropping duplicate command id={} ({})", request.id, request.payload);
            return false;
        }

        let ticket = self.next_ticket();
        entries.push_back(QueuedCommand { ticket, request });
        drop(entries);

        self.notify.notify_one();
        true
    }

    /// Wait for the head of the queue and return a copy of it
    ///
    /// The entry stays queued until [`CommandQueue::complete`] is called
    /// with its ticket.
    pub async fn dequeue_front(&self) -> QueuedCommand {
        loop {
            let notified = self.notify.notified();
            if let Some(front) = self.entries.lock().await.front() {
                return front.clone();
            }
            notified.await;
        }
    }

    /// Remove a finished entry
    ///
    /// Returns false if the entry is gone already (replaced by a reset).
    pub async fn complete(&self, ticket: u64) -> bool {
        let mut entries = self.entries.lock().await;
        if let Some(pos) = entries.iter().position(|e| e.ticket == ticket) {
            entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Throw away everything queued and leave only `request`
    pub async fn replace_all(&self, request: CommandRequest) {
        let ticket = self.next_ticket();
        let mut entries = self.entries.lock().await;
        entries.clear();
        entries.push_back(QueuedCommand { ticket, request });
        drop(entries);

        self.notify.notify_one();
    }

    /// Ids of queued commands the client can track, in queue order
    pub async fn backlog_ids(&self) -> Vec<i64> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| e.request.is_tracked())
            .map(|e| e.request.id)
            .collect()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
