//! Store Contract
//!
//! Abstract operations shared by every expiring-store engine.

use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::{Result, StoreError};

/// Subset of entries a lifetime change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeScope {
    /// Every entry, existing ones included
    All,
    /// Entries created or renewed from now on
    NewAndUpdated,
    /// Entries created from now on
    New,
}

/// Contract implemented by every expiring-store engine.
///
/// Values cross the boundary serialized: the provided [`add`](Store::add),
/// [`get`](Store::get), and [`set`](Store::set) helpers encode caller
/// values to bytes and decode payloads back, failing with
/// [`StoreError::TypeMismatch`] when a payload cannot be read as the
/// requested type. The required `*_bytes` methods move raw payloads and
/// keep the trait object-safe.
///
/// Engines differ in what they can express. An engine that delegates
/// expiration to a native TTL index may answer [`count`](Store::count) or
/// some [`set_lifetime`](Store::set_lifetime) scopes with
/// [`StoreError::Unsupported`], treat [`gc`](Store::gc) as a no-op, and,
/// where its reclamation is eventually consistent, re-validate an entry's
/// creation timestamp against the lifetime before trusting its presence.
pub trait Store: Send + Sync {
    /// Insert a new entry under `key` with the default lifetime
    fn add_bytes(&self, key: &str, value: Bytes) -> Result<()>;

    /// Fetch the payload under `key`, renewing the entry unless transient
    fn get_bytes(&self, key: &str) -> Result<Bytes>;

    /// Replace the payload under `key`, renewing the entry unless transient
    fn set_bytes(&self, key: &str, value: Bytes) -> Result<()>;

    /// Remove the entry under `key`
    fn delete(&self, key: &str) -> Result<()>;

    /// Number of live entries
    fn count(&self) -> Result<usize>;

    /// Remove every entry, live or expired
    fn flush(&self) -> Result<()>;

    /// Reclaim expired entries opportunistically; best-effort
    fn gc(&self);

    /// Change the default lifetime for the given scope
    fn set_lifetime(&self, lifetime: Duration, scope: LifetimeScope) -> Result<()>;

    /// Switch between transient and sliding-expiration semantics
    fn set_transient(&self, transient: bool);

    /// Adjust the integer counter under `key` by +1, creating it at 1
    fn increment(&self, _key: &str) -> Result<i64> {
        Err(StoreError::Unsupported("increment"))
    }

    /// Adjust the integer counter under `key` by -1, creating it at -1
    fn decrement(&self, _key: &str) -> Result<i64> {
        Err(StoreError::Unsupported("decrement"))
    }

    /// Insert a new entry under `key`, encoding `value`
    fn add<T: Serialize>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.add_bytes(key, codec::encode(value)?)
    }

    /// Fetch the value under `key`, decoded as `T`
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T>
    where
        Self: Sized,
    {
        codec::decode(&self.get_bytes(key)?)
    }

    /// Replace the value under `key`, encoding `value`
    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.set_bytes(key, codec::encode(value)?)
    }
}
