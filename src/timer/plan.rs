//! Session plans: which steps a timer walks through and for how long

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

pub const DEFAULT_REST_SECONDS: u32 = 15;
pub const DEFAULT_WORKOUT_ROUNDS: u32 = 4;
pub const DEFAULT_MEDITATION_MINUTES: u32 = 5;
pub const MAX_MEDITATION_MINUTES: u32 = 120;
pub const MAX_ROUNDS: u32 = 20;
pub const MAX_REST_SECONDS: u32 = 600;

/// One timed exercise, pose or sitting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub duration_seconds: u32,
}

impl Step {
    pub fn new(name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
        }
    }
}

/// An ordered list of exercises repeated for a number of rounds, with a fixed
/// rest between every two consecutive steps (round boundaries included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionPlan {
    name: String,
    exercises: Vec<Step>,
    rest_seconds: u32,
    rounds: u32,
    calories_estimate: u32,
}

impl SessionPlan {
    pub fn new(
        name: impl Into<String>,
        exercises: Vec<Step>,
        rest_seconds: u32,
        rounds: u32,
    ) -> Result<Self, PlanError> {
        if exercises.is_empty() {
            return Err(PlanError::NoExercises);
        }
        if rounds == 0 {
            return Err(PlanError::NoRounds);
        }
        if rounds > MAX_ROUNDS {
            return Err(PlanError::TooManyRounds {
                got: rounds,
                max: MAX_ROUNDS,
            });
        }
        if rest_seconds > MAX_REST_SECONDS {
            return Err(PlanError::RestTooLong {
                got: rest_seconds,
                max: MAX_REST_SECONDS,
            });
        }
        if let Some(step) = exercises.iter().find(|s| s.duration_seconds == 0) {
            return Err(PlanError::ZeroDuration(step.name.clone()));
        }

        Ok(Self {
            name: name.into(),
            exercises,
            rest_seconds,
            rounds,
            calories_estimate: 0,
        })
    }

    /// Calories credited when the plan is completed
    pub fn with_calories(mut self, calories: u32) -> Self {
        self.calories_estimate = calories;
        self
    }

    /// The cardio circuit: four 45-second exercises
    pub fn workout(rest_seconds: u32, rounds: u32) -> Result<Self, PlanError> {
        let exercises = vec![
            Step::new("High Knees", 45),
            Step::new("Jumping Jacks", 45),
            Step::new("Mountain Climbers", 45),
            Step::new("Burpees", 45),
        ];
        Ok(Self::new("HIIT Cardio Blast", exercises, rest_seconds, rounds)?.with_calories(350))
    }

    /// A single uninterrupted sitting
    pub fn meditation(minutes: u32) -> Result<Self, PlanError> {
        if minutes == 0 || minutes > MAX_MEDITATION_MINUTES {
            return Err(PlanError::MeditationLength {
                got: minutes,
                max: MAX_MEDITATION_MINUTES,
            });
        }
        Self::new(
            format!("{} Minute Meditation", minutes),
            vec![Step::new("Breathe", minutes * 60)],
            0,
            1,
        )
    }

    pub fn yoga() -> Self {
        Self {
            name: "Morning Flow".to_string(),
            exercises: vec![
                Step::new("Mountain Pose", 30),
                Step::new("Downward-Facing Dog", 45),
                Step::new("Warrior I", 60),
                Step::new("Tree Pose", 60),
                Step::new("Child's Pose", 60),
            ],
            rest_seconds: 0,
            rounds: 1,
            calories_estimate: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exercises(&self) -> &[Step] {
        &self.exercises
    }

    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn calories_estimate(&self) -> u32 {
        self.calories_estimate
    }

    /// Exercises times rounds
    pub fn total_steps(&self) -> usize {
        self.exercises.len() * self.rounds as usize
    }

    /// Step at a flattened index (round-major)
    pub fn step(&self, index: usize) -> Option<&Step> {
        if index >= self.total_steps() {
            return None;
        }
        self.exercises.get(index % self.exercises.len())
    }

    /// 1-based round containing the flattened step index
    pub fn round_of(&self, index: usize) -> u32 {
        (index / self.exercises.len()) as u32 + 1
    }

    /// Ticks from start to completion: every step plus the rests between them
    pub fn total_seconds(&self) -> u64 {
        let active: u64 = self
            .exercises
            .iter()
            .map(|s| u64::from(s.duration_seconds))
            .sum::<u64>()
            * u64::from(self.rounds);
        let rests = (self.total_steps() as u64).saturating_sub(1) * u64::from(self.rest_seconds);
        active + rests
    }

    /// Whole minutes, rounded up
    pub fn total_minutes(&self) -> u32 {
        self.total_seconds().div_ceil(60) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_plans() {
        assert_eq!(SessionPlan::new("x", vec![], 0, 1), Err(PlanError::NoExercises));
        assert_eq!(
            SessionPlan::new("x", vec![Step::new("a", 10)], 0, 0),
            Err(PlanError::NoRounds)
        );
        assert_eq!(
            SessionPlan::new("x", vec![Step::new("a", 0)], 0, 1),
            Err(PlanError::ZeroDuration("a".to_string()))
        );
        assert_eq!(
            SessionPlan::workout(15, u32::MAX),
            Err(PlanError::TooManyRounds { got: u32::MAX, max: MAX_ROUNDS })
        );
        assert_eq!(
            SessionPlan::workout(MAX_REST_SECONDS + 1, 1),
            Err(PlanError::RestTooLong { got: MAX_REST_SECONDS + 1, max: MAX_REST_SECONDS })
        );
        assert!(SessionPlan::workout(MAX_REST_SECONDS, MAX_ROUNDS).is_ok());
        assert!(SessionPlan::meditation(0).is_err());
        assert!(SessionPlan::meditation(MAX_MEDITATION_MINUTES + 1).is_err());
    }

    #[test]
    fn steps_repeat_across_rounds() {
        let plan = SessionPlan::workout(15, 2).unwrap();
        assert_eq!(plan.total_steps(), 8);
        assert_eq!(plan.step(4).unwrap().name, "High Knees");
        assert_eq!(plan.round_of(3), 1);
        assert_eq!(plan.round_of(4), 2);
        assert!(plan.step(8).is_none());
    }

    #[test]
    fn totals_include_rest_between_rounds() {
        // 16 steps of 45s, 15 rests of 15s
        let plan = SessionPlan::workout(DEFAULT_REST_SECONDS, DEFAULT_WORKOUT_ROUNDS).unwrap();
        assert_eq!(plan.total_seconds(), 16 * 45 + 15 * 15);
        assert_eq!(plan.total_minutes(), 16);

        let yoga = SessionPlan::yoga();
        assert_eq!(yoga.total_seconds(), 255);
        assert_eq!(yoga.total_minutes(), 5);
    }
}
