//! Per-key single-shot debounce timers.
//!
//! Time is passed in explicitly, so the owner decides what "now" is: the
//! server feeds `Instant::now()` from a ticker, tests feed synthetic instants.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
struct Pending<V> {
    deadline: Instant,
    value: V,
}

/// Debounce queue holding the latest value per key.
///
/// Every [`touch`](Self::touch) replaces the value and restarts that key's
/// timer. Keys are independent of each other.
#[derive(Debug)]
pub struct AutoSave<K, V> {
    window: Duration,
    pending: HashMap<K, Pending<V>>,
}

impl<K: Eq + Hash + Clone + Ord, V> AutoSave<K, V> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        self.pending.get(key).map(|p| &p.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.pending.iter().map(|(key, p)| (key, &p.value))
    }

    /// Record a new value and (re)start the key's timer.
    pub fn touch(&mut self, key: K, value: V, now: Instant) {
        self.pending.insert(
            key,
            Pending {
                deadline: now + self.window,
                value,
            },
        );
    }

    /// Remove a key without firing it.
    pub fn cancel(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|p| p.value)
    }

    /// Move a pending entry to a new key, keeping its deadline.
    pub fn rekey(&mut self, from: &K, to: K) {
        if let Some(pending) = self.pending.remove(from) {
            self.pending.insert(to, pending);
        }
    }

    /// Take every entry whose deadline has passed, earliest first.
    pub fn due(&mut self, now: Instant) -> Vec<(K, V)> {
        self.take_where(|_, deadline| deadline <= now)
    }

    /// Take every entry whose key matches, earliest first.
    pub fn take_matching(&mut self, mut pred: impl FnMut(&K) -> bool) -> Vec<(K, V)> {
        self.take_where(|key, _| pred(key))
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    fn take_where(&mut self, mut pred: impl FnMut(&K, Instant) -> bool) -> Vec<(K, V)> {
        let mut keys: Vec<(Instant, K)> = self
            .pending
            .iter()
            .filter(|(key, p)| pred(key, p.deadline))
            .map(|(key, p)| (p.deadline, key.clone()))
            .collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|(_, key)| self.pending.remove(&key).map(|p| (key, p.value)))
            .collect()
    }
}
