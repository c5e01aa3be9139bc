//! Daily water intake, counted in glasses

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::TrackerError,
    storage::{StatKey, StatStore},
};

/// Intake is capped at this multiple of the goal
pub const GOAL_CAP_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSummary {
    pub glasses: f64,
    pub goal: f64,
    pub cap: f64,
    pub progress: f64,
}

#[derive(Debug, Clone)]
pub struct WaterTracker {
    stats: Arc<StatStore>,
}

impl WaterTracker {
    pub fn new(stats: Arc<StatStore>) -> Self {
        Self { stats }
    }

    pub fn intake(&self) -> f64 {
        self.stats.load(StatKey::WaterGlasses)
    }

    pub fn goal(&self) -> f64 {
        self.stats.load(StatKey::WaterGoal)
    }

    pub fn cap(&self) -> f64 {
        self.goal() * GOAL_CAP_FACTOR
    }

    /// Fraction of the goal reached; may exceed 1.0 up to the cap
    pub fn progress(&self) -> f64 {
        let goal = self.goal();
        if goal <= 0.0 {
            return 0.0;
        }
        self.intake() / goal
    }

    /// Log `amount` glasses, clamped at the cap; returns the new intake
    pub fn add(&self, amount: f64) -> Result<f64, TrackerError> {
        positive("amount", amount)?;
        let cap = self.cap();
        Ok(self
            .stats
            .modify(StatKey::WaterGlasses, |glasses| (glasses + amount).min(cap)))
    }

    /// Take back one whole glass; does nothing below one glass
    pub fn remove(&self) -> f64 {
        self.stats.modify(StatKey::WaterGlasses, |glasses| {
            if glasses >= 1.0 {
                glasses - 1.0
            } else {
                glasses
            }
        })
    }

    pub fn reset(&self) {
        self.stats.reset(StatKey::WaterGlasses);
    }

    pub fn set_goal(&self, goal: f64) -> Result<(), TrackerError> {
        positive("goal", goal)?;
        info!("Water goal set to {} glasses", goal);
        self.stats.update(StatKey::WaterGoal, goal);
        Ok(())
    }

    pub fn summary(&self) -> WaterSummary {
        WaterSummary {
            glasses: self.intake(),
            goal: self.goal(),
            cap: self.cap(),
            progress: self.progress(),
        }
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<f64, TrackerError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TrackerError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::{
        storage::{FixedClock, MemoryStore, Storage},
        tasks::PersistHandle,
    };

    fn tracker() -> WaterTracker {
        let backend = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
        let writer = PersistHandle::spawn(backend.clone());
        WaterTracker::new(Arc::new(StatStore::new(Storage::new(backend, writer, clock))))
    }

    #[tokio::test]
    async fn four_glasses_is_half_the_default_goal() {
        let water = tracker();
        for _ in 0..4 {
            water.add(1.0).unwrap();
        }
        assert_eq!(water.intake(), 4.0);
        assert_eq!(water.progress(), 0.5);
    }

    #[tokio::test]
    async fn intake_clamps_at_one_and_a_half_times_goal() {
        let water = tracker();
        for _ in 0..20 {
            water.add(1.0).unwrap();
        }
        assert_eq!(water.intake(), 12.0);
        assert_eq!(water.summary().cap, 12.0);
    }

    #[tokio::test]
    async fn remove_only_takes_whole_glasses() {
        let water = tracker();
        water.add(0.5).unwrap();
        assert_eq!(water.remove(), 0.5);
        water.add(1.0).unwrap();
        assert_eq!(water.remove(), 0.5);
    }

    #[tokio::test]
    async fn concurrent_removes_never_go_negative() {
        let water = tracker();
        water.add(3.0).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let water = water.clone();
                std::thread::spawn(move || water.remove())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap() >= 0.0);
        }
        assert_eq!(water.intake(), 0.0);
    }

    #[tokio::test]
    async fn rejects_non_positive_input() {
        let water = tracker();
        assert!(water.add(0.0).is_err());
        assert!(water.add(f64::NAN).is_err());
        assert!(water.set_goal(-1.0).is_err());
        water.set_goal(10.0).unwrap();
        assert_eq!(water.cap(), 15.0);
    }
}
