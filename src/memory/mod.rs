//! In-Memory Engine
//!
//! Coarse reader/writer lock over the entry map with sweep-on-access
//! expiration.

mod entry;
mod sweep;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::codec;
use crate::error::{Result, StoreError};
use crate::store::{LifetimeScope, Store};

use self::entry::Entry;
use self::sweep::{EntryMap, SweepGuard, SweepThrottle};

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Default lifetime applied to new entries and on renewal
    pub lifetime: Duration,
    /// When true, access never extends an entry's life
    pub transient: bool,
    /// Skip a sweep while less than one-fifth of the lifetime has passed
    /// since the previous one
    pub sweep_throttle: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(60),
            transient: false,
            sweep_throttle: true,
        }
    }
}

impl StoreConfig {
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    pub fn with_sweep_throttle(mut self, enabled: bool) -> Self {
        self.sweep_throttle = enabled;
        self
    }
}

#[derive(Debug)]
struct StoreInner {
    entries: RwLock<EntryMap>,
    lifetime: Mutex<Duration>,
    transient: AtomicBool,
    throttle: SweepThrottle,
}

/// Expiring key-value store backed by one reader/writer lock.
///
/// Every operation begins with a lazy sweep of expired entries. The sweep
/// takes the read lock, upgrades to the write lock at most once when it
/// finds something to reclaim, and hands the operation whatever guard it
/// ended up holding; the operation adapts that to the mode it needs. With
/// the throttle enabled the sweep may be skipped entirely, so every
/// access re-checks liveness at the entry itself.
///
/// Cloning is cheap; clones share the same store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_config(StoreConfig::default())
    }
}

impl MemoryStore {
    /// Create a store with sliding-expiration semantics: every successful
    /// read or write restarts the touched entry's lifetime
    pub fn new(lifetime: Duration) -> Self {
        Self::with_config(StoreConfig::default().with_lifetime(lifetime))
    }

    /// Create a store whose entries expire a fixed lifetime after
    /// creation, regardless of access
    pub fn transient(lifetime: Duration) -> Self {
        Self::with_config(
            StoreConfig::default()
                .with_lifetime(lifetime)
                .with_transient(true),
        )
    }

    /// Create a store from explicit configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(EntryMap::new()),
                lifetime: Mutex::new(config.lifetime),
                transient: AtomicBool::new(config.transient),
                throttle: SweepThrottle::new(config.sweep_throttle),
            }),
        }
    }

    /// Number of entries physically present, including expired ones not
    /// yet swept
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Whether the map is physically empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys (for debugging/testing)
    pub fn keys(&self) -> Vec<String> {
        let map = self.inner.entries.read();
        map.iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Current default lifetime
    fn lifetime(&self) -> Duration {
        *self.inner.lifetime.lock()
    }

    /// Lifetime to renew a touched entry to, or None under transient
    /// semantics
    fn renewal(&self) -> Option<Duration> {
        if self.inner.transient.load(Ordering::Relaxed) {
            None
        } else {
            Some(self.lifetime())
        }
    }

    /// Reclaim expired entries, handing back whatever lock the pass ended
    /// up holding.
    ///
    /// The scan runs under the read lock; on the first expired entry it
    /// trades the read guard for the write guard once and reclaims in a
    /// single pass. The retained write-lock scan re-checks expiry, so an
    /// entry touched by a racing reader between the two guards is never
    /// reclaimed live.
    fn sweep(&self) -> SweepGuard<'_> {
        if !self.inner.throttle.admit(self.lifetime() / 5) {
            return SweepGuard::Skipped;
        }

        let map = self.inner.entries.read();
        if !map.values().any(|entry| entry.is_expired()) {
            return SweepGuard::Read(map);
        }
        drop(map);

        let mut map = self.inner.entries.write();
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired());
        let removed = before - map.len();
        if removed > 0 {
            debug!(removed, "swept expired entries");
        }
        SweepGuard::Write(map)
    }

    /// Counter read-modify-write shared by increment and decrement
    fn adjust(&self, key: &str, delta: i64) -> Result<i64> {
        let renewal = self.renewal();
        let apply = |value: &mut Bytes| -> Result<i64> {
            let next = codec::decode::<i64>(value)?.wrapping_add(delta);
            *value = codec::encode(&next)?;
            Ok(next)
        };

        let map = self.sweep().into_read(&self.inner.entries);
        if let Some(result) = map.get(key).and_then(|e| e.modify_if_live(renewal, apply)) {
            return result;
        }
        drop(map);

        // Absent or expired: create under the write lock, re-checking in
        // case a racing caller created it first
        let mut map = self.inner.entries.write();
        if let Some(result) = map.get(key).and_then(|e| e.modify_if_live(renewal, apply)) {
            return result;
        }
        map.insert(key.to_owned(), Entry::new(codec::encode(&delta)?, self.lifetime()));
        Ok(delta)
    }
}

impl Store for MemoryStore {
    fn add_bytes(&self, key: &str, value: Bytes) -> Result<()> {
        let mut map = self.sweep().into_write(&self.inner.entries);
        let occupied = map.get(key).map(|e| !e.is_expired()).unwrap_or(false);
        if occupied {
            return Err(StoreError::DuplicateKey(key.to_owned()));
        }
        // An expired entry behaves as absent; the insert reclaims its slot
        map.insert(key.to_owned(), Entry::new(value, self.lifetime()));
        Ok(())
    }

    fn get_bytes(&self, key: &str) -> Result<Bytes> {
        let map = self.sweep().into_read(&self.inner.entries);
        map.get(key)
            .and_then(|entry| entry.value_if_live(self.renewal()))
            .ok_or_else(|| StoreError::InvalidKey(key.to_owned()))
    }

    fn set_bytes(&self, key: &str, value: Bytes) -> Result<()> {
        let map = self.sweep().into_read(&self.inner.entries);
        let replaced = map
            .get(key)
            .map(|entry| entry.replace_if_live(value, self.renewal()))
            .unwrap_or(false);
        if replaced {
            Ok(())
        } else {
            Err(StoreError::InvalidKey(key.to_owned()))
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut map = self.sweep().into_write(&self.inner.entries);
        match map.remove(key) {
            Some(entry) if !entry.is_expired() => Ok(()),
            // Removing an expired entry reclaims the slot but the key
            // still reads as absent
            _ => Err(StoreError::InvalidKey(key.to_owned())),
        }
    }

    fn count(&self) -> Result<usize> {
        let map = self.sweep().into_read(&self.inner.entries);
        Ok(map.values().filter(|entry| !entry.is_expired()).count())
    }

    fn flush(&self) -> Result<()> {
        // Clears everything anyway, so the sweep is bypassed
        let mut map = self.inner.entries.write();
        *map = EntryMap::new();
        Ok(())
    }

    fn gc(&self) {
        drop(self.sweep());
    }

    fn set_lifetime(&self, lifetime: Duration, scope: LifetimeScope) -> Result<()> {
        match scope {
            LifetimeScope::New => Err(StoreError::Unsupported("lifetime scope `new`")),
            LifetimeScope::NewAndUpdated => {
                *self.inner.lifetime.lock() = lifetime;
                Ok(())
            }
            LifetimeScope::All => {
                *self.inner.lifetime.lock() = lifetime;
                // Values mutate in place under the read lock; expired
                // entries stay expired rather than coming back to life
                let map = self.sweep().into_read(&self.inner.entries);
                for entry in map.values() {
                    entry.renew_if_live(lifetime);
                }
                Ok(())
            }
        }
    }

    fn set_transient(&self, transient: bool) {
        self.inner.transient.store(transient, Ordering::Relaxed);
    }

    fn increment(&self, key: &str) -> Result<i64> {
        self.adjust(key, 1)
    }

    fn decrement(&self, key: &str) -> Result<i64> {
        self.adjust(key, -1)
    }
}
