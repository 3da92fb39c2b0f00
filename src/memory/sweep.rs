//! Sweep Machinery
//!
//! Lock-state handoff between the lazy sweep and the operation that
//! triggered it, plus the minimum-interval throttle.

use std::time::{Duration, Instant};

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::entry::Entry;

pub(crate) type EntryMap = HashMap<String, Entry>;

/// Lock state the sweep leaves behind, owning the guard it names.
///
/// Each operation adapts this to the mode it needs instead of assuming
/// one; dropping the value releases exactly the lock held.
pub(crate) enum SweepGuard<'a> {
    /// Throttle skipped the sweep; no lock taken
    Skipped,
    /// Scan found nothing expired; read lock still held
    Read(RwLockReadGuard<'a, EntryMap>),
    /// Scan upgraded to reclaim expired entries; write lock held
    Write(RwLockWriteGuard<'a, EntryMap>),
}

impl<'a> SweepGuard<'a> {
    /// Adapt to shared access: downgrade a held write guard, keep a read
    /// guard, or acquire one fresh
    pub(crate) fn into_read(self, lock: &'a RwLock<EntryMap>) -> RwLockReadGuard<'a, EntryMap> {
        match self {
            SweepGuard::Skipped => lock.read(),
            SweepGuard::Read(guard) => guard,
            SweepGuard::Write(guard) => RwLockWriteGuard::downgrade(guard),
        }
    }

    /// Adapt to exclusive access: keep a held write guard, or release the
    /// read guard and acquire write
    pub(crate) fn into_write(self, lock: &'a RwLock<EntryMap>) -> RwLockWriteGuard<'a, EntryMap> {
        match self {
            SweepGuard::Skipped => lock.write(),
            SweepGuard::Read(guard) => {
                drop(guard);
                lock.write()
            }
            SweepGuard::Write(guard) => guard,
        }
    }
}

/// Minimum-interval guard amortizing sweep cost under high call rates
#[derive(Debug)]
pub(crate) struct SweepThrottle {
    enabled: bool,
    last: Mutex<Option<Instant>>,
}

impl SweepThrottle {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: Mutex::new(None),
        }
    }

    /// Whether a sweep may begin now, recording it when admitted.
    ///
    /// Skips while less than `min_interval` has elapsed since the last
    /// admitted sweep.
    pub(crate) fn admit(&self, min_interval: Duration) -> bool {
        if !self.enabled {
            return true;
        }
        let mut last = self.last.lock();
        if let Some(at) = *last {
            if at.elapsed() < min_interval {
                return false;
            }
        }
        *last = Some(Instant::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_disabled_throttle_always_admits() {
        let throttle = SweepThrottle::new(false);
        assert!(throttle.admit(Duration::from_secs(60)));
        assert!(throttle.admit(Duration::from_secs(60)));
    }

    #[test]
    fn test_throttle_skips_within_interval() {
        let throttle = SweepThrottle::new(true);
        assert!(throttle.admit(Duration::from_millis(80)));
        assert!(!throttle.admit(Duration::from_millis(80)));

        thread::sleep(Duration::from_millis(120));
        assert!(throttle.admit(Duration::from_millis(80)));
    }

    #[test]
    fn test_zero_interval_never_skips() {
        let throttle = SweepThrottle::new(true);
        assert!(throttle.admit(Duration::ZERO));
        assert!(throttle.admit(Duration::ZERO));
    }

    #[test]
    fn test_into_read_downgrades_write() {
        let lock = RwLock::new(EntryMap::new());
        let held = SweepGuard::Write(lock.write());
        let read = held.into_read(&lock);

        // Shared mode: other readers run, writers do not
        assert!(lock.try_read().is_some());
        assert!(lock.try_write().is_none());
        drop(read);
        assert!(lock.try_write().is_some());
    }

    #[test]
    fn test_into_write_upgrades_read() {
        let lock = RwLock::new(EntryMap::new());
        let held = SweepGuard::Read(lock.read());
        let write = held.into_write(&lock);

        // Exclusive mode
        assert!(lock.try_read().is_none());
        drop(write);
        assert!(lock.try_read().is_some());
    }

    #[test]
    fn test_skipped_acquires_fresh() {
        let lock = RwLock::new(EntryMap::new());
        let read = SweepGuard::Skipped.into_read(&lock);
        assert!(lock.try_write().is_none());
        drop(read);

        let write = SweepGuard::Skipped.into_write(&lock);
        assert!(lock.try_read().is_none());
        drop(write);
    }
}
