//! Timestamped key-value cache with an explicit freshness policy.
//!
//! Entries are never evicted by age: a read past the TTL reports
//! [`CacheLookup::Stale`] with the old value so the owner can decide whether
//! to recompute or serve it anyway.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<V> {
    Fresh(V),
    Stale(V),
    Miss,
}

impl<V> CacheLookup<V> {
    /// The cached value regardless of freshness.
    pub fn into_value(self) -> Option<V> {
        match self {
            CacheLookup::Fresh(v) | CacheLookup::Stale(v) => Some(v),
            CacheLookup::Miss => None,
        }
    }
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (V, DateTime<Utc>)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    /// An entry is fresh while `now - stored_at < ttl`. A timestamp in the
    /// future counts as fresh.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> CacheLookup<V> {
        let entries = self.entries.read();
        match entries.get(key) {
            None => CacheLookup::Miss,
            Some((value, stored_at)) => {
                let fresh = (now - *stored_at).to_std().map_or(true, |age| age < self.ttl);
                if fresh {
                    CacheLookup::Fresh(value.clone())
                } else {
                    CacheLookup::Stale(value.clone())
                }
            }
        }
    }

    pub fn put(&self, key: K, value: V, stored_at: DateTime<Utc>) {
        self.entries.write().insert(key, (value, stored_at));
    }

    /// Force the next read of `key` to be stale by resetting its timestamp
    /// to the epoch. The value is kept. Returns whether the key was present.
    pub fn invalidate(&self, key: &K) -> bool {
        match self.entries.write().get_mut(key) {
            Some((_, stored_at)) => {
                *stored_at = DateTime::<Utc>::UNIX_EPOCH;
                true
            }
            None => false,
        }
    }
}
