//! PERISHABLE - Expiring Key-Value Store
//!
//! Values live under string keys for a configurable lifetime; once past
//! it they behave as absent and are reclaimed by a lazy sweep that runs
//! inline with ordinary operations instead of on a background thread.
//! By default every successful read or write restarts the touched
//! entry's lifetime; a transient store keeps pure TTL-since-creation
//! semantics.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use perishable::{MemoryStore, Store};
//!
//! # fn main() -> Result<(), perishable::StoreError> {
//! let store = MemoryStore::new(Duration::from_secs(300));
//! store.add("session:1", &"alice")?;
//!
//! let user: String = store.get("session:1")?;
//! assert_eq!(user, "alice");
//! assert_eq!(store.count()?, 1);
//! # Ok(())
//! # }
//! ```

mod codec;
pub mod error;
pub mod memory;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreConfig};
pub use store::{LifetimeScope, Store};
