//! Waiting queue of participants seeking a match
//!
//! Entries are kept in insertion order so the candidate scan is
//! deterministic. Every entry owns a timeout in a `DelayQueue`; the
//! membership map and the timer queue are only ever changed together,
//! so a timeout can never fire for an entry that was already removed.

use std::future::poll_fn;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::Instant;
use tokio_util::time::{delay_queue, DelayQueue};

use crate::types::ClientId;

struct WaitingEntry {
    enqueued_at: Instant,
    timeout_key: delay_queue::Key,
}

pub struct WaitingQueue {
    entries: IndexMap<ClientId, WaitingEntry>,
    timeouts: DelayQueue<ClientId>,
    timeout: Duration,
}

impl WaitingQueue {
    /// Create a queue whose entries expire after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: IndexMap::new(),
            timeouts: DelayQueue::new(),
            timeout,
        }
    }

    /// Add a participant and arm its search timeout
    ///
    /// Re-enqueueing an id replaces its entry and restarts the timeout.
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&mut self, id: ClientId, now: Instant) {
        self.remove(id);
        let timeout_key = self.timeouts.insert(id, self.timeout);
        self.entries.insert(
            id,
            WaitingEntry {
                enqueued_at: now,
                timeout_key,
            },
        );
    }

    /// Remove a participant and cancel its timeout
    ///
    /// Returns false if the participant was not waiting.
    pub fn remove(&mut self, id: ClientId) -> bool {
        match self.entries.shift_remove(&id) {
            Some(entry) => {
                self.timeouts.try_remove(&entry.timeout_key);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn enqueued_at(&self, id: ClientId) -> Option<Instant> {
        self.entries.get(&id).map(|e| e.enqueued_at)
    }

    /// Waiting participants in insertion order
    pub fn candidates(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wait for the next search timeout
    ///
    /// Resolves with the participant whose timeout elapsed; the entry has
    /// already been removed. Resolves with `None` immediately when nothing
    /// is waiting. Cancel safe.
    pub async fn next_expired(&mut self) -> Option<ClientId> {
        let expired = poll_fn(|cx| self.timeouts.poll_expired(cx)).await?;
        let id = expired.into_inner();
        self.entries.shift_remove(&id);
        Some(id)
    }
}

impl std::fmt::Debug for WaitingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitingQueue")
            .field("waiting", &self.entries.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[tokio::test(start_paused = true)]
    async fn test_candidates_in_insertion_order() {
        let mut queue = WaitingQueue::new(TIMEOUT);
        let ids: Vec<ClientId> = (0..4).map(|_| ClientId::new()).collect();
        for id in &ids {
            queue.enqueue(*id, Instant::now());
        }

        queue.remove(ids[1]);

        let order: Vec<ClientId> = queue.candidates().collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[3]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_absent_is_noop() {
        let mut queue = WaitingQueue::new(TIMEOUT);
        assert!(!queue.remove(ClientId::new()));
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_removes_entry() {
        let mut queue = WaitingQueue::new(TIMEOUT);
        let id = ClientId::new();
        queue.enqueue(id, Instant::now());

        let start = Instant::now();
        assert_eq!(queue.next_expired().await, Some(id));
        assert!(start.elapsed() >= TIMEOUT);
        assert!(!queue.contains(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_entry_never_expires() {
        let mut queue = WaitingQueue::new(TIMEOUT);
        let a = ClientId::new();
        let b = ClientId::new();
        queue.enqueue(a, Instant::now());
        tokio::time::advance(Duration::from_secs(5)).await;
        queue.enqueue(b, Instant::now());

        queue.remove(a);

        assert_eq!(queue.next_expired().await, Some(b));
        assert_eq!(queue.next_expired().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reenqueue_restarts_timeout() {
        let mut queue = WaitingQueue::new(TIMEOUT);
        let id = ClientId::new();
        queue.enqueue(id, Instant::now());
        tokio::time::advance(Duration::from_secs(20)).await;

        queue.enqueue(id, Instant::now());
        assert_eq!(queue.len(), 1);

        let start = Instant::now();
        assert_eq!(queue.enqueued_at(id), Some(start));
        assert_eq!(queue.next_expired().await, Some(id));
        assert!(start.elapsed() >= TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_queue_resolves_none() {
        let mut queue = WaitingQueue::new(TIMEOUT);
        assert_eq!(queue.next_expired().await, None);
    }
}
