//! Per-feature views over the stat store

pub mod blog;
pub mod calories;
pub mod checklist;
pub mod dashboard;
pub mod water;

pub use blog::{BlogFeed, BlogPost};
pub use calories::{CalorieSummary, CalorieTracker, Meal, MealCategory, NewMeal};
pub use checklist::{Checklist, ChecklistTask};
pub use dashboard::{vital_cards, VitalCard};
pub use water::{WaterSummary, WaterTracker};
