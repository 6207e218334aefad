//! Response cache that lives for the current scheduler turn.
//!
//! A stored entry is removed by a task spawned at store time, so it survives
//! only until the storing task next yields to the runtime. This collapses
//! duplicate polls issued within one logical operation; it is not a TTL.
//!
//! On a multi-threaded runtime the removal task may run on another worker
//! before the storing task continues, so a hit is never guaranteed. Two
//! concurrent writers for the same slot race; the later store wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

/// Methods whose responses are cached.
pub const CACHED_METHODS: [&str; 3] = ["status", "EXPERIMENTAL_genesis_config", "block"];

/// How cache slots are keyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheKeying {
    /// One slot per method; a `block` call for any selector hits the last
    /// `block` response of the turn.
    #[default]
    Method,
    /// One slot per method and parameter set.
    MethodAndParams,
}

#[derive(Debug)]
struct Slot {
    stamp: u64,
    value: Value,
}

type Slots = Arc<Mutex<HashMap<String, Slot>>>;

#[derive(Debug)]
pub struct ResponseCache {
    keying: CacheKeying,
    slots: Slots,
    stamps: AtomicU64,
}

fn lock(slots: &Slots) -> MutexGuard<'_, HashMap<String, Slot>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ResponseCache {
    pub fn new(keying: CacheKeying) -> Self {
        Self {
            keying,
            slots: Arc::default(),
            stamps: AtomicU64::new(0),
        }
    }

    /// Returns true if responses to `method` are cached.
    pub fn is_cacheable(method: &str) -> bool {
        CACHED_METHODS.contains(&method)
    }

    fn key(&self, method: &str, params: &Value) -> String {
        match self.keying {
            CacheKeying::Method => method.to_string(),
            CacheKeying::MethodAndParams => format!("{method}:{params}"),
        }
    }

    /// Cached response for this request, if one was stored this turn.
    pub fn get(&self, method: &str, params: &Value) -> Option<Value> {
        if !Self::is_cacheable(method) {
            return None;
        }
        lock(&self.slots)
            .get(&self.key(method, params))
            .map(|slot| slot.value.clone())
    }

    /// Store a successful response and schedule its removal for the next turn.
    ///
    /// Outside a tokio runtime nothing could schedule the removal, so nothing
    /// is stored.
    pub fn store(&self, method: &str, params: &Value, value: Value) {
        if !Self::is_cacheable(method) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let key = self.key(method, params);
        let stamp = self.stamps.fetch_add(1, Ordering::Relaxed);
        lock(&self.slots).insert(key.clone(), Slot { stamp, value });

        let slots = Arc::clone(&self.slots);
        handle.spawn(async move {
            let mut slots = lock(&slots);
            if slots.get(&key).is_some_and(|slot| slot.stamp == stamp) {
                slots.remove(&key);
            }
        });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
