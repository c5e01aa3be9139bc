//! Vitals cards shown on the discover screen

use serde::{Deserialize, Serialize};

use crate::storage::{StatKey, StatStore};

const HEART_RATE_TARGET: f64 = 100.0;
const SLEEP_TARGET_HOURS: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalCard {
    pub key: StatKey,
    pub title: String,
    pub value: f64,
    pub target: f64,
    pub unit: String,
    pub progress: f64,
}

impl VitalCard {
    fn new(key: StatKey, title: &str, value: f64, target: f64, unit: &str) -> Self {
        let progress = if target > 0.0 { (value / target).max(0.0) } else { 0.0 };
        Self {
            key,
            title: title.to_string(),
            value,
            target,
            unit: unit.to_string(),
            progress,
        }
    }
}

/// Cards in display order; each card's `key` is the stat a client edits
pub fn vital_cards(stats: &StatStore) -> Vec<VitalCard> {
    vec![
        VitalCard::new(
            StatKey::Steps,
            "Steps",
            stats.load(StatKey::Steps),
            stats.load(StatKey::StepGoal),
            "steps",
        ),
        VitalCard::new(
            StatKey::HeartRate,
            "Heart Rate",
            stats.load(StatKey::HeartRate),
            HEART_RATE_TARGET,
            "bpm",
        ),
        VitalCard::new(
            StatKey::SleepHours,
            "Sleep",
            stats.load(StatKey::SleepHours),
            SLEEP_TARGET_HOURS,
            "hrs",
        ),
        VitalCard::new(
            StatKey::CaloriesConsumed,
            "Calories",
            stats.load(StatKey::CaloriesConsumed),
            stats.load(StatKey::CalorieGoal),
            "kcal",
        ),
        VitalCard::new(
            StatKey::WaterGlasses,
            "Water",
            stats.load(StatKey::WaterGlasses),
            stats.load(StatKey::WaterGoal),
            "glasses",
        ),
    ]
}
