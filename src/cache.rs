//! Bounded name → icon cache.
//!
//! Keys must already be normalized (lowercase); the cache stores whatever
//! it is given.  Eviction is strict FIFO: when full, the entry inserted
//! first goes first.  Re-setting an existing key updates its value without
//! moving it, and reads never reorder anything.
//!
//! Every [`clear`](NameCache::clear) starts a new epoch.  A writer that
//! computed its value before a clear can use
//! [`set_if_epoch`](NameCache::set_if_epoch) so that value is dropped
//! instead of outliving the clear.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Room for about fifty different applications.
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Default)]
struct Inner {
    icons: HashMap<String, String>,
    order: VecDeque<String>,
    epoch: u64,
}

/// Thread-safe FIFO cache shared by all resolution workers.
#[derive(Debug)]
pub struct NameCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl NameCache {
    /// Create a cache with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache holding at most `capacity` entries.  A zero capacity
    /// falls back to [`DEFAULT_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        Self {
            inner: Mutex::new(Inner {
                icons: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
                epoch: 0,
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded data stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up the icon cached for `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().icons.get(name).cloned()
    }

    /// Cache `icon` for `name`, evicting the oldest entry if full.
    pub fn set(&self, name: &str, icon: &str) {
        let mut inner = self.lock();
        self.insert(&mut inner, name, icon);
    }

    /// Like [`set`](Self::set), but only if the cache has not been cleared
    /// since `epoch` was read.  Returns whether the entry was stored.
    pub fn set_if_epoch(&self, epoch: u64, name: &str, icon: &str) -> bool {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return false;
        }
        self.insert(&mut inner, name, icon);
        true
    }

    /// The current epoch; see [`set_if_epoch`](Self::set_if_epoch).
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    fn insert(&self, inner: &mut Inner, name: &str, icon: &str) {
        if let Some(existing) = inner.icons.get_mut(name) {
            *existing = icon.to_string();
            return;
        }
        if inner.icons.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.icons.remove(&oldest);
            }
        }
        inner.order.push_back(name.to_string());
        inner.icons.insert(name.to_string(), icon.to_string());
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.icons.clear();
        inner.order.clear();
        inner.epoch += 1;
    }

    pub fn len(&self) -> usize {
        self.lock().icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().icons.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for NameCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn get_after_set() {
        let cache = NameCache::new();
        assert_eq!(cache.get("firefox"), None);
        cache.set("firefox", "F");
        assert_eq!(cache.get("firefox").as_deref(), Some("F"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_capacity_uses_default() {
        assert_eq!(NameCache::with_capacity(0).capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn evicts_oldest_first() {
        let cache = NameCache::with_capacity(3);
        for name in ["a", "b", "c"] {
            cache.set(name, name);
        }
        cache.set("d", "d");
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("a"), None);
        assert!(cache.get("b").is_some());

        cache.set("e", "e");
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c").as_deref(), Some("c"));
        assert_eq!(cache.get("e").as_deref(), Some("e"));
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let cache = NameCache::with_capacity(5);
        for i in 0..100 {
            cache.set(&format!("app{}", i), "x");
            assert!(cache.len() <= 5);
        }
        // The survivors are exactly the last five inserted.
        for i in 95..100 {
            assert!(cache.get(&format!("app{}", i)).is_some());
        }
    }

    #[test]
    fn update_keeps_eviction_position() {
        let cache = NameCache::with_capacity(2);
        cache.set("a", "1");
        cache.set("b", "2");
        cache.set("a", "3");
        assert_eq!(cache.get("a").as_deref(), Some("3"));
        assert_eq!(cache.len(), 2);

        // "a" was inserted first, so it is still the one to go.
        cache.set("c", "4");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn reads_do_not_reorder() {
        let cache = NameCache::with_capacity(2);
        cache.set("a", "1");
        cache.set("b", "2");
        assert!(cache.get("a").is_some());
        cache.set("c", "3");
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn clear_resets_order_too() {
        let cache = NameCache::with_capacity(2);
        cache.set("a", "1");
        cache.set("b", "2");
        cache.clear();
        assert!(cache.is_empty());

        cache.set("c", "3");
        cache.set("d", "4");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn writes_from_before_a_clear_are_dropped() {
        let cache = NameCache::new();
        let epoch = cache.epoch();
        assert!(cache.set_if_epoch(epoch, "a", "1"));
        cache.clear();
        assert!(!cache.set_if_epoch(epoch, "b", "2"));
        assert_eq!(cache.get("b"), None);
        assert!(cache.set_if_epoch(cache.epoch(), "b", "2"));
        assert_eq!(cache.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn concurrent_writers_respect_capacity() {
        let cache = Arc::new(NameCache::with_capacity(8));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        cache.set(&format!("t{}-{}", t, i), "x");
                        let _ = cache.get(&format!("t{}-{}", t, i / 2));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
    }
}
