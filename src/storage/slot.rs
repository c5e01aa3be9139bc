//! Cached, write-through persisted values

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{Clock, DateScoped, KeyValueStore, Scope};
use crate::tasks::PersistHandle;

/// Shared persistence plumbing: where values are read from, where writes go,
/// and what day it is.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
    writer: PersistHandle,
    clock: Arc<dyn Clock>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>, writer: PersistHandle, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            writer,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Wait for every queued write to reach the backend
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Read a stored value. Missing, unreadable and malformed entries all come
    /// back as `None`; the latter two are logged.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<DateScoped<T>> {
        match self.backend.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring malformed stored value for {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to load {}: {}", key, e);
                None
            }
        }
    }

    /// Queue a write; never blocks on the backend
    fn write<T: Serialize>(&self, key: &str, value: &DateScoped<T>) {
        match serde_json::to_string(value) {
            Ok(json) => self.writer.write(key, json),
            Err(e) => warn!("Failed to serialize {}: {}", key, e),
        }
    }

    fn remove(&self, key: &str) {
        self.writer.remove(key);
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("today", &self.today())
            .finish_non_exhaustive()
    }
}

/// One persisted value, loaded on first access and written through on change.
///
/// Daily slots fall back to their default (and persist that reset) the first
/// time they are touched on a new calendar day.
pub struct Slot<T> {
    key: String,
    scope: Scope,
    default: T,
    storage: Storage,
    cell: Mutex<Option<DateScoped<T>>>,
}

impl<T> Slot<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn new(storage: Storage, key: impl Into<String>, scope: Scope, default: T) -> Self {
        Self {
            key: key.into(),
            scope,
            default,
            storage,
            cell: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn get(&self) -> T {
        self.persisted().value
    }

    /// Current value together with the day it belongs to
    pub fn persisted(&self) -> DateScoped<T> {
        let mut cell = self.lock();
        let today = self.storage.today();
        self.current(&mut cell, today).clone()
    }

    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Mutate in place and write the result through
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut cell = self.lock();
        let today = self.storage.today();
        let current = self.current(&mut cell, today);
        let result = f(&mut current.value);
        current.date = Some(today);
        self.storage.write(&self.key, current);
        result
    }

    pub fn reset(&self) {
        self.set(self.default.clone());
    }

    /// Back to the default and drop the stored entry altogether
    pub fn clear(&self) {
        let mut cell = self.lock();
        *cell = Some(DateScoped::new(self.default.clone(), self.storage.today()));
        self.storage.remove(&self.key);
    }

    /// Loaded and day-checked value, performing the load or daily reset if needed
    fn current<'a>(
        &self,
        cell: &'a mut Option<DateScoped<T>>,
        today: NaiveDate,
    ) -> &'a mut DateScoped<T> {
        let loaded = cell.take().unwrap_or_else(|| match self.storage.read(&self.key) {
            Some(stored) => {
                debug!("Loaded {} from storage", self.key);
                stored
            }
            None => DateScoped::new(self.default.clone(), today),
        });

        let fresh = if loaded.is_stale(self.scope, today) {
            info!("New day for {}, resetting to default", self.key);
            let reset = DateScoped::new(self.default.clone(), today);
            self.storage.write(&self.key, &reset);
            reset
        } else {
            loaded
        };

        cell.insert(fresh)
    }

    fn lock(&self) -> MutexGuard<'_, Option<DateScoped<T>>> {
        // A panic elsewhere cannot leave a half-written value behind, so keep going.
        self.cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FixedClock, MemoryStore};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn storage_at(d: u32) -> (Storage, Arc<MemoryStore>, Arc<FixedClock>) {
        let backend = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(day(d)));
        let writer = PersistHandle::spawn(backend.clone());
        (Storage::new(backend.clone(), writer, clock.clone()), backend, clock)
    }

    #[tokio::test]
    async fn missing_value_reads_default_without_writing() {
        let (storage, backend, _) = storage_at(19);
        let slot = Slot::new(storage.clone(), "meals", Scope::Daily, Vec::<u32>::new());

        assert!(slot.get().is_empty());
        storage.flush().await;
        assert_eq!(backend.get("meals").unwrap(), None);
    }

    #[tokio::test]
    async fn update_writes_through() {
        let (storage, backend, _) = storage_at(19);
        let slot = Slot::new(storage.clone(), "meals", Scope::Daily, Vec::<u32>::new());

        let len = slot.update(|meals| {
            meals.push(300);
            meals.len()
        });
        assert_eq!(len, 1);
        storage.flush().await;

        let raw = backend.get("meals").unwrap().unwrap();
        let stored: DateScoped<Vec<u32>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, DateScoped::new(vec![300], day(19)));
    }

    #[tokio::test]
    async fn malformed_stored_value_falls_back_to_default() {
        let (storage, backend, _) = storage_at(19);
        backend.set("meals", "not json").unwrap();
        let slot = Slot::new(storage, "meals", Scope::Lifetime, vec![1u32]);
        assert_eq!(slot.get(), vec![1]);
    }

    #[tokio::test]
    async fn daily_slot_resets_when_the_day_rolls_over_mid_session() {
        let (storage, _, clock) = storage_at(19);
        let slot = Slot::new(storage, "water", Scope::Daily, 0.0f64);

        slot.set(5.0);
        assert_eq!(slot.get(), 5.0);

        clock.advance_days(1);
        assert_eq!(slot.get(), 0.0);
        assert_eq!(slot.persisted().date, Some(day(20)));
    }

    #[tokio::test]
    async fn clear_drops_the_stored_entry() {
        let (storage, backend, _) = storage_at(19);
        let slot = Slot::new(storage.clone(), "logs", Scope::Lifetime, Vec::<u32>::new());

        slot.set(vec![1, 2]);
        storage.flush().await;
        assert!(backend.get("logs").unwrap().is_some());

        slot.clear();
        storage.flush().await;
        assert!(slot.get().is_empty());
        assert_eq!(backend.get("logs").unwrap(), None);
    }
}
