//! Dead-Letter Queue
//!
//! Holds webhook deliveries that exhausted their retries so tenants can
//! read back what they missed. The queue is bounded: once full, the oldest
//! entry is evicted to make room.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::domain::shared::{AccountId, Timestamp};
use crate::observability::record_dead_letter_evicted;

/// Entries kept when no capacity is configured.
pub const DEFAULT_DEAD_LETTER_CAPACITY: usize = 1_000;

/// A delivery that exhausted its retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadLetter {
    /// Subscriber account.
    pub account_id: AccountId,
    /// Target URL.
    pub url: String,
    /// Event name.
    pub event: String,
    /// Last error seen.
    pub error: String,
    /// Attempts made.
    pub attempts: u32,
    /// When the delivery was given up.
    pub failed_at: Timestamp,
}

/// Bounded, oldest-first store of dead letters shared by the dispatcher
/// and the subscription API.
#[derive(Debug)]
pub struct DeadLetterQueue {
    capacity: usize,
    entries: Mutex<VecDeque<DeadLetter>>,
}

impl DeadLetterQueue {
    /// Create a queue holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
        }
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry, evicting the oldest when full.
    pub fn push(&self, letter: DeadLetter) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= self.capacity {
            if let Some(evicted) = entries.pop_front() {
                tracing::warn!(
                    account_id = %evicted.account_id,
                    event = %evicted.event,
                    capacity = self.capacity,
                    "Dead-letter queue full, evicting oldest entry"
                );
                record_dead_letter_evicted(&evicted.event);
            }
        }
        entries.push_back(letter);
    }

    /// Every entry, oldest first.
    #[must_use]
    pub fn all(&self) -> Vec<DeadLetter> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Entries for one account, oldest first.
    #[must_use]
    pub fn for_account(&self, account_id: &AccountId) -> Vec<DeadLetter> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|letter| &letter.account_id == account_id)
            .cloned()
            .collect()
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been dead-lettered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeadLetterQueue {
    fn default() -> Self {
        Self::new(DEFAULT_DEAD_LETTER_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(account: &str, event: &str) -> DeadLetter {
        DeadLetter {
            account_id: AccountId::new(account),
            url: format!("https://{account}.test/hook"),
            event: event.to_string(),
            error: "HTTP 503".to_string(),
            attempts: 3,
            failed_at: Timestamp::now(),
        }
    }

    #[test]
    fn full_queue_evicts_oldest() {
        let queue = DeadLetterQueue::new(2);
        queue.push(letter("a1", "orderProcessed"));
        queue.push(letter("a1", "orderRejected"));
        queue.push(letter("a2", "kycAccepted"));

        let events: Vec<_> = queue.all().into_iter().map(|l| l.event).collect();
        assert_eq!(events, vec!["orderRejected", "kycAccepted"]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn reads_are_scoped_to_the_account() {
        let queue = DeadLetterQueue::default();
        queue.push(letter("a1", "orderProcessed"));
        queue.push(letter("a2", "kycAccepted"));
        queue.push(letter("a1", "paymentFailed"));

        let mine: Vec<_> = queue
            .for_account(&AccountId::new("a1"))
            .into_iter()
            .map(|l| l.event)
            .collect();
        assert_eq!(mine, vec!["orderProcessed", "paymentFailed"]);
        assert!(queue.for_account(&AccountId::new("a3")).is_empty());
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest() {
        let queue = DeadLetterQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.push(letter("a1", "orderProcessed"));
        queue.push(letter("a1", "orderRejected"));
        assert_eq!(queue.all()[0].event, "orderRejected");
        assert!(!queue.is_empty());
    }
}
