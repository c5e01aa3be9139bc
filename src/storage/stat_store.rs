//! Named progress metrics shared by every tracker

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Scope, Slot, Storage};

/// Every metric the store knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Steps,
    StepGoal,
    HeartRate,
    SleepHours,
    WaterGlasses,
    WaterGoal,
    CaloriesConsumed,
    CaloriesBurned,
    CalorieGoal,
    MeditationSessions,
    MeditationMinutes,
    WorkoutSessions,
    WorkoutMinutes,
    WorkoutCalories,
    YogaSessions,
}

impl StatKey {
    pub const ALL: [StatKey; 15] = [
        StatKey::Steps,
        StatKey::StepGoal,
        StatKey::HeartRate,
        StatKey::SleepHours,
        StatKey::WaterGlasses,
        StatKey::WaterGoal,
        StatKey::CaloriesConsumed,
        StatKey::CaloriesBurned,
        StatKey::CalorieGoal,
        StatKey::MeditationSessions,
        StatKey::MeditationMinutes,
        StatKey::WorkoutSessions,
        StatKey::WorkoutMinutes,
        StatKey::WorkoutCalories,
        StatKey::YogaSessions,
    ];

    /// Storage key, also used in URLs
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::Steps => "steps",
            StatKey::StepGoal => "step_goal",
            StatKey::HeartRate => "heart_rate",
            StatKey::SleepHours => "sleep_hours",
            StatKey::WaterGlasses => "water_glasses",
            StatKey::WaterGoal => "water_goal",
            StatKey::CaloriesConsumed => "calories_consumed",
            StatKey::CaloriesBurned => "calories_burned",
            StatKey::CalorieGoal => "calorie_goal",
            StatKey::MeditationSessions => "meditation_sessions",
            StatKey::MeditationMinutes => "meditation_minutes",
            StatKey::WorkoutSessions => "workout_sessions",
            StatKey::WorkoutMinutes => "workout_minutes",
            StatKey::WorkoutCalories => "workout_calories",
            StatKey::YogaSessions => "yoga_sessions",
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            StatKey::StepGoal => 10_000.0,
            StatKey::HeartRate => 72.0,
            StatKey::SleepHours => 7.5,
            StatKey::WaterGoal => 8.0,
            StatKey::CalorieGoal => 2000.0,
            _ => 0.0,
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            StatKey::Steps
            | StatKey::WaterGlasses
            | StatKey::CaloriesConsumed
            | StatKey::CaloriesBurned => Scope::Daily,
            _ => Scope::Lifetime,
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown stat: {}", s))
    }
}

/// Read-only view of one stat as it is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedStat {
    pub key: StatKey,
    pub value: f64,
    pub scope: Scope,
    pub date: Option<NaiveDate>,
}

/// Persisted metrics keyed by `StatKey`.
///
/// Passed explicitly to whatever needs it; reads and writes never fail from
/// the caller's point of view.
#[derive(Debug)]
pub struct StatStore {
    storage: Storage,
    slots: HashMap<StatKey, Slot<f64>>,
}

impl StatStore {
    pub fn new(storage: Storage) -> Self {
        let slots = StatKey::ALL
            .iter()
            .map(|&key| {
                let slot = Slot::new(storage.clone(), key.as_str(), key.scope(), key.default_value());
                (key, slot)
            })
            .collect();
        Self { storage, slots }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Read every stat from the backend now instead of on first request
    pub fn preload(&self) {
        for key in StatKey::ALL {
            self.slot(key).get();
        }
        debug!("Preloaded {} stats", StatKey::ALL.len());
    }

    /// Current value; daily stats from an earlier day come back as their default
    pub fn load(&self, key: StatKey) -> f64 {
        self.slot(key).get()
    }

    pub fn update(&self, key: StatKey, value: f64) {
        debug!("Updating {} to {}", key, value);
        self.slot(key).set(value);
    }

    /// Add `delta` and return the new value
    pub fn add(&self, key: StatKey, delta: f64) -> f64 {
        self.slot(key).update(|value| {
            *value += delta;
            *value
        })
    }

    /// Apply `f` to the current value, store its result and return it
    pub fn modify(&self, key: StatKey, f: impl FnOnce(f64) -> f64) -> f64 {
        self.slot(key).update(|value| {
            *value = f(*value);
            *value
        })
    }

    pub fn reset(&self, key: StatKey) {
        info!("Resetting {} to {}", key, key.default_value());
        self.slot(key).reset();
    }

    pub fn reset_all(&self) {
        for key in StatKey::ALL {
            self.reset(key);
        }
    }

    pub fn persisted(&self, key: StatKey) -> PersistedStat {
        let slot = self.slot(key);
        let scoped = slot.persisted();
        PersistedStat {
            key,
            value: scoped.value,
            scope: slot.scope(),
            date: scoped.date,
        }
    }

    /// All stats keyed by their storage name
    pub fn snapshot(&self) -> HashMap<&'static str, f64> {
        StatKey::ALL
            .iter()
            .map(|&key| (key.as_str(), self.load(key)))
            .collect()
    }

    fn slot(&self, key: StatKey) -> &Slot<f64> {
        // Every key gets a slot in `new`.
        &self.slots[&key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        storage::{FixedClock, KeyValueStore, MemoryStore},
        tasks::PersistHandle,
    };

    fn store() -> (StatStore, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
        let writer = PersistHandle::spawn(backend.clone());
        (StatStore::new(Storage::new(backend.clone(), writer, clock)), backend)
    }

    #[test]
    fn keys_parse_from_their_storage_names() {
        for key in StatKey::ALL {
            assert_eq!(key.as_str().parse::<StatKey>().unwrap(), key);
        }
        assert!("heartRate".parse::<StatKey>().is_err());
    }

    #[tokio::test]
    async fn defaults_are_documented_values() {
        let (stats, _) = store();
        assert_eq!(stats.load(StatKey::WaterGoal), 8.0);
        assert_eq!(stats.load(StatKey::CalorieGoal), 2000.0);
        assert_eq!(stats.load(StatKey::Steps), 0.0);
    }

    #[tokio::test]
    async fn add_and_modify_write_through() {
        let (stats, backend) = store();
        assert_eq!(stats.add(StatKey::YogaSessions, 1.0), 1.0);
        assert_eq!(stats.modify(StatKey::YogaSessions, |v| v * 10.0), 10.0);
        stats.storage().flush().await;

        let raw = backend.get("yoga_sessions").unwrap().unwrap();
        assert!(raw.contains("10.0"));
    }

    #[tokio::test]
    async fn reset_all_restores_every_default() {
        let (stats, _) = store();
        stats.update(StatKey::HeartRate, 90.0);
        stats.update(StatKey::Steps, 1234.0);
        stats.reset_all();
        assert_eq!(stats.load(StatKey::HeartRate), 72.0);
        assert_eq!(stats.load(StatKey::Steps), 0.0);
    }

    #[tokio::test]
    async fn snapshot_covers_every_key() {
        let (stats, _) = store();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.len(), StatKey::ALL.len());
        assert_eq!(snapshot["sleep_hours"], 7.5);
    }

    #[tokio::test]
    async fn preload_reads_every_stat_up_front() {
        let (stats, backend) = store();
        backend.set("heart_rate", r#"{"value": 61.0, "date": "2026-10-19"}"#).unwrap();
        stats.preload();

        // Later backend changes are not re-read once cached
        backend.set("heart_rate", r#"{"value": 99.0, "date": "2026-10-19"}"#).unwrap();
        assert_eq!(stats.load(StatKey::HeartRate), 61.0);
    }
}
