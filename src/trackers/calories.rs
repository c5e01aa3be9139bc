//! Calorie budget and today's meal log

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::water::positive;
use crate::{
    error::TrackerError,
    storage::{Scope, Slot, StatKey, StatStore},
};

pub const MEALS_KEY: &str = "calorie_meals";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: u64,
    pub name: String,
    pub calories: u32,
    pub category: MealCategory,
    /// Local time the meal was logged, `HH:MM`
    pub time: String,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

/// Meal as submitted by the user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMeal {
    pub name: String,
    pub calories: u32,
    #[serde(default)]
    pub category: MealCategory,
    #[serde(default)]
    pub protein: u32,
    #[serde(default)]
    pub carbs: u32,
    #[serde(default)]
    pub fat: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieSummary {
    pub consumed: f64,
    pub burned: f64,
    pub goal: f64,
    /// goal - consumed + burned
    pub remaining: f64,
    pub progress: f64,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub meals: Vec<Meal>,
}

/// Consumed, burned and the meal log reset every day; the goal does not.
#[derive(Debug)]
pub struct CalorieTracker {
    stats: Arc<StatStore>,
    meals: Slot<Vec<Meal>>,
}

impl CalorieTracker {
    pub fn new(stats: Arc<StatStore>) -> Self {
        let meals = Slot::new(stats.storage().clone(), MEALS_KEY, Scope::Daily, Vec::new());
        Self { stats, meals }
    }

    pub fn meals(&self) -> Vec<Meal> {
        self.meals.get()
    }

    pub fn add_meal(&self, meal: NewMeal) -> Result<Meal, TrackerError> {
        let name = meal.name.trim();
        if name.is_empty() {
            return Err(TrackerError::Empty("meal name"));
        }

        let logged = self.meals.update(|meals| {
            let id = meals.iter().map(|m| m.id).max().unwrap_or(0) + 1;
            let logged = Meal {
                id,
                name: name.to_string(),
                calories: meal.calories,
                category: meal.category,
                time: Local::now().format("%H:%M").to_string(),
                protein: meal.protein,
                carbs: meal.carbs,
                fat: meal.fat,
            };
            meals.push(logged.clone());
            logged
        });

        self.stats
            .add(StatKey::CaloriesConsumed, f64::from(logged.calories));
        info!("Logged meal '{}' ({} kcal)", logged.name, logged.calories);
        Ok(logged)
    }

    pub fn delete_meal(&self, id: u64) -> Result<Meal, TrackerError> {
        let removed = self.meals.update(|meals| {
            let index = meals.iter().position(|m| m.id == id)?;
            Some(meals.remove(index))
        });
        let removed = removed.ok_or(TrackerError::NotFound { kind: "meal", id })?;

        let calories = f64::from(removed.calories);
        self.stats
            .modify(StatKey::CaloriesConsumed, |consumed| (consumed - calories).max(0.0));
        info!("Deleted meal '{}'", removed.name);
        Ok(removed)
    }

    /// Log calories burned by activity; returns today's total
    pub fn add_burned(&self, calories: f64) -> Result<f64, TrackerError> {
        positive("calories", calories)?;
        Ok(self.stats.add(StatKey::CaloriesBurned, calories))
    }

    pub fn set_goal(&self, goal: f64) -> Result<(), TrackerError> {
        positive("goal", goal)?;
        info!("Calorie goal set to {}", goal);
        self.stats.update(StatKey::CalorieGoal, goal);
        Ok(())
    }

    /// Clear today's log without touching the goal
    pub fn reset(&self) {
        self.meals.reset();
        self.stats.reset(StatKey::CaloriesConsumed);
        self.stats.reset(StatKey::CaloriesBurned);
    }

    pub fn summary(&self) -> CalorieSummary {
        let consumed = self.stats.load(StatKey::CaloriesConsumed);
        let burned = self.stats.load(StatKey::CaloriesBurned);
        let goal = self.stats.load(StatKey::CalorieGoal);
        let meals = self.meals();

        CalorieSummary {
            consumed,
            burned,
            goal,
            remaining: goal - consumed + burned,
            progress: if goal > 0.0 { consumed / goal } else { 0.0 },
            protein: meals.iter().map(|m| m.protein).sum(),
            carbs: meals.iter().map(|m| m.carbs).sum(),
            fat: meals.iter().map(|m| m.fat).sum(),
            meals,
        }
    }
}
