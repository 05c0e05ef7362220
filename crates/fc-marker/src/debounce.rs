//! Per-key debouncing with generation tokens.
//!
//! Scheduling a key again before its deadline supersedes the earlier
//! schedule: the old [`Ticket`] goes stale and the deadline moves. Time is
//! always supplied by the caller.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A scheduled run for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket<K> {
    /// The key.
    pub key: K,
    /// Generation of this schedule; stale once the key is rescheduled.
    pub generation: u64,
    /// When the run is due.
    pub deadline: Instant,
}

/// Coalesces repeated requests per key into one run after a quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    delay: Duration,
    next_generation: u64,
    pending: HashMap<K, (u64, Instant)>,
}

impl<K: Copy + Eq + Hash> Debouncer<K> {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_generation: 0,
            pending: HashMap::new(),
        }
    }

    /// The quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `key` to run `delay` after `now`, superseding any earlier schedule.
    pub fn schedule(&mut self, key: K, now: Instant) -> Ticket<K> {
        self.next_generation += 1;
        let generation = self.next_generation;
        let deadline = now + self.delay;
        self.pending.insert(key, (generation, deadline));
        Ticket {
            key,
            generation,
            deadline,
        }
    }

    /// Drop the pending run for `key`. Returns false if none was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Drop every pending run.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Whether `key` has a pending run.
    pub fn is_scheduled(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Claim a ticket when its timer fires. Returns false if the ticket was
    /// superseded or cancelled; a claimed ticket stops being pending.
    pub fn fire(&mut self, ticket: &Ticket<K>) -> bool {
        match self.pending.get(&ticket.key) {
            Some((generation, _)) if *generation == ticket.generation => {
                self.pending.remove(&ticket.key);
                true
            }
            _ => false,
        }
    }

    /// Claim every run due at `now`, earliest first.
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        let mut ready: Vec<(Instant, u64, K)> = self
            .pending
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(key, (generation, deadline))| (*deadline, *generation, *key))
            .collect();
        ready.sort_by_key(|(deadline, generation, _)| (*deadline, *generation));
        for (_, _, key) in &ready {
            self.pending.remove(key);
        }
        ready.into_iter().map(|(_, _, key)| key).collect()
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(_, deadline)| *deadline).min()
    }
}
