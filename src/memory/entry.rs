//! Entry Bookkeeping
//!
//! One stored payload with its expiration state.

use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;

/// Interior state guarded by the entry lock
#[derive(Debug)]
struct EntryState {
    value: Bytes,
    expires_at: Instant,
    lifetime: Duration,
}

impl EntryState {
    /// Restart the deadline: `expires_at` is always the last touch plus
    /// the lifetime in effect at that touch
    fn renew(&mut self, lifetime: Duration) {
        self.lifetime = lifetime;
        self.expires_at = Instant::now() + self.lifetime;
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Entry in the store with payload and expiration bookkeeping.
///
/// All mutation goes through a per-entry mutex, which is what makes
/// renewal and in-place value replacement safe while only the map's read
/// lock is held. Lock order is map before entry, one entry at a time.
#[derive(Debug)]
pub(crate) struct Entry {
    state: Mutex<EntryState>,
}

impl Entry {
    pub(crate) fn new(value: Bytes, lifetime: Duration) -> Self {
        Self {
            state: Mutex::new(EntryState {
                value,
                expires_at: Instant::now() + lifetime,
                lifetime,
            }),
        }
    }

    /// Whether the deadline has passed
    pub(crate) fn is_expired(&self) -> bool {
        self.state.lock().is_expired()
    }

    /// Clone the payload if the entry is live, renewing it when a new
    /// lifetime is supplied
    pub(crate) fn value_if_live(&self, renew_to: Option<Duration>) -> Option<Bytes> {
        let mut state = self.state.lock();
        if state.is_expired() {
            return None;
        }
        if let Some(lifetime) = renew_to {
            state.renew(lifetime);
        }
        Some(state.value.clone())
    }

    /// Replace the payload if the entry is live
    pub(crate) fn replace_if_live(&self, value: Bytes, renew_to: Option<Duration>) -> bool {
        let mut state = self.state.lock();
        if state.is_expired() {
            return false;
        }
        state.value = value;
        if let Some(lifetime) = renew_to {
            state.renew(lifetime);
        }
        true
    }

    /// Rewrite the payload through `f` if the entry is live
    pub(crate) fn modify_if_live<R>(
        &self,
        renew_to: Option<Duration>,
        f: impl FnOnce(&mut Bytes) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        if state.is_expired() {
            return None;
        }
        let out = f(&mut state.value);
        if let Some(lifetime) = renew_to {
            state.renew(lifetime);
        }
        Some(out)
    }

    /// Restart the entry's life under a new lifetime if it is live
    pub(crate) fn renew_if_live(&self, lifetime: Duration) -> bool {
        let mut state = self.state.lock();
        if state.is_expired() {
            return false;
        }
        state.renew(lifetime);
        true
    }

    /// Lifetime in effect at the last touch
    #[cfg(test)]
    pub(crate) fn lifetime(&self) -> Duration {
        self.state.lock().lifetime
    }
}
