//! Local persistence
//!
//! Values are JSON documents behind string keys. Every value is cached in
//! memory once read, and every change is queued to a background writer so
//! callers never wait on disk.

pub mod backend;
pub mod date_scoped;
pub mod slot;
pub mod stat_store;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use date_scoped::{Clock, DateScoped, FixedClock, Scope, SystemClock};
pub use slot::{Slot, Storage};
pub use stat_store::{PersistedStat, StatKey, StatStore};
