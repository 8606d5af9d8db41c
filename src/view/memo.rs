//! Memo<K, V> — a single-slot memoization cell keyed by input identity.
//!
//! Each derived view keeps one cell holding the key built from the exact
//! inputs it last consumed (table generations, selection pointer values)
//! together with the computed output. A call with an equal key returns the
//! cached output without recomputing; any other key recomputes and replaces
//! the slot. There is no deep value comparison anywhere — the store's
//! copy-on-write discipline makes the generation a sound change signal.
//!
//! All methods take `&self` (interior mutability via `parking_lot::Mutex`),
//! so views can be evaluated from shared references. The lock is held across
//! the compute closure; views are pure and cheap, so this never contends
//! meaningfully.

use parking_lot::Mutex;

/// Single-slot cache: remembers the last `(key, value)` pair.
pub struct Memo<K, V> {
    slot: Mutex<Option<(K, V)>>,
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if `key` matches the last call, otherwise run
    /// `compute` and cache its result under `key`.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        let mut slot = self.slot.lock();
        if let Some((cached_key, cached_value)) = slot.as_ref() {
            if *cached_key == key {
                return cached_value.clone();
            }
        }
        let value = compute();
        *slot = Some((key, value.clone()));
        value
    }
}

impl<K: PartialEq, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
