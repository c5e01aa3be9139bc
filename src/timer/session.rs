//! Session timer state machine.
//!
//! The timer has no clock of its own: whoever owns it calls `tick()` once per
//! elapsed second while it is running.
//!
//! ```text
//! Active --0s--> Resting --0s--> Active (next step) ... --0s--> Completed
//! ```
//!
//! With a zero-second rest the timer goes from one Active step straight to
//! the next.

use serde::{Deserialize, Serialize};

use super::plan::{SessionPlan, Step};
use crate::utils::format_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Active,
    Resting,
    Completed,
}

/// Transitions reported by the timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    StepStarted { index: usize, round: u32 },
    RestStarted { after_step: usize, seconds: u32 },
    Completed,
}

#[derive(Debug, Clone)]
pub struct SessionTimer {
    plan: SessionPlan,
    phase: Phase,
    remaining_seconds: u32,
    step_index: usize,
    running: bool,
    elapsed_seconds: u64,
}

impl SessionTimer {
    /// A timer parked on the first step, not yet running
    pub fn new(plan: SessionPlan) -> Self {
        let remaining_seconds = first_duration(&plan);
        Self {
            plan,
            phase: Phase::Active,
            remaining_seconds,
            step_index: 0,
            running: false,
            elapsed_seconds: 0,
        }
    }

    // Queries

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn current_step_index(&self) -> usize {
        self.step_index
    }

    pub fn total_steps(&self) -> usize {
        self.plan.total_steps()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.plan.step(self.step_index)
    }

    pub fn current_round(&self) -> u32 {
        self.plan.round_of(self.step_index)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Seconds counted while running, rests included
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Length of the current phase in seconds
    pub fn phase_length(&self) -> u32 {
        match self.phase {
            Phase::Active => self.current_step().map(|s| s.duration_seconds).unwrap_or(0),
            Phase::Resting => self.plan.rest_seconds(),
            Phase::Completed => 0,
        }
    }

    /// 0.0 .. 1.0 through the current phase
    pub fn phase_progress(&self) -> f64 {
        match self.phase {
            Phase::Completed => 1.0,
            _ => {
                let total = self.phase_length();
                if total == 0 {
                    return 0.0;
                }
                1.0 - f64::from(self.remaining_seconds) / f64::from(total)
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            plan: self.plan.name().to_string(),
            phase: self.phase,
            running: self.running,
            step_name: match self.phase {
                Phase::Resting => "Rest".to_string(),
                Phase::Completed => "Done".to_string(),
                Phase::Active => self.current_step().map(|s| s.name.clone()).unwrap_or_default(),
            },
            remaining_seconds: self.remaining_seconds,
            clock: format_clock(u64::from(self.remaining_seconds)),
            current_step_index: self.step_index,
            total_steps: self.total_steps(),
            current_round: self.current_round(),
            total_rounds: self.plan.rounds(),
            phase_progress: self.phase_progress(),
            elapsed_seconds: self.elapsed_seconds,
        }
    }

    // Commands

    /// Begin from the first step
    pub fn start(&mut self) -> TimerEvent {
        self.rewind();
        self.running = true;
        TimerEvent::StepStarted {
            index: 0,
            round: 1,
        }
    }

    /// Returns false when there was nothing to pause
    pub fn pause(&mut self) -> bool {
        if !self.running || self.is_completed() {
            return false;
        }
        self.running = false;
        true
    }

    /// Returns false when already running or finished
    pub fn resume(&mut self) -> bool {
        if self.running || self.is_completed() {
            return false;
        }
        self.running = true;
        true
    }

    /// Back to the first step, stopped
    pub fn reset(&mut self) {
        self.rewind();
    }

    /// One elapsed second
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running || self.is_completed() {
            return None;
        }

        self.elapsed_seconds += 1;
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return None;
        }

        let phase = self.phase;
        Some(match phase {
            Phase::Active if self.has_next_step() => {
                let rest = self.plan.rest_seconds();
                if rest > 0 {
                    self.phase = Phase::Resting;
                    self.remaining_seconds = rest;
                    TimerEvent::RestStarted {
                        after_step: self.step_index,
                        seconds: rest,
                    }
                } else {
                    self.enter_step(self.step_index + 1)
                }
            }
            Phase::Active => self.complete(),
            Phase::Resting => self.enter_step(self.step_index + 1),
            Phase::Completed => return None,
        })
    }

    /// Skip whatever is left of this step (and the following rest)
    pub fn next_step(&mut self) -> Option<TimerEvent> {
        if self.is_completed() {
            return None;
        }
        if self.has_next_step() {
            Some(self.enter_step(self.step_index + 1))
        } else {
            Some(self.complete())
        }
    }

    /// Restart the previous step; on the first step, restart it
    pub fn previous_step(&mut self) -> Option<TimerEvent> {
        if self.is_completed() {
            return None;
        }
        Some(self.enter_step(self.step_index.saturating_sub(1)))
    }

    fn has_next_step(&self) -> bool {
        self.step_index + 1 < self.total_steps()
    }

    fn enter_step(&mut self, index: usize) -> TimerEvent {
        self.step_index = index;
        self.phase = Phase::Active;
        self.remaining_seconds = self.plan.step(index).map(|s| s.duration_seconds).unwrap_or(0);
        TimerEvent::StepStarted {
            index,
            round: self.plan.round_of(index),
        }
    }

    fn complete(&mut self) -> TimerEvent {
        self.phase = Phase::Completed;
        self.remaining_seconds = 0;
        self.running = false;
        TimerEvent::Completed
    }

    fn rewind(&mut self) {
        self.phase = Phase::Active;
        self.step_index = 0;
        self.remaining_seconds = first_duration(&self.plan);
        self.running = false;
        self.elapsed_seconds = 0;
    }
}

fn first_duration(plan: &SessionPlan) -> u32 {
    plan.step(0).map(|s| s.duration_seconds).unwrap_or(0)
}

/// Serializable view of a timer for status endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub plan: String,
    pub phase: Phase,
    pub running: bool,
    pub step_name: String,
    pub remaining_seconds: u32,
    pub clock: String,
    pub current_step_index: usize,
    pub total_steps: usize,
    pub current_round: u32,
    pub total_rounds: u32,
    pub phase_progress: f64,
    pub elapsed_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit(steps: usize, duration: u32, rest: u32) -> SessionTimer {
        let exercises = (0..steps)
            .map(|i| Step::new(format!("exercise {}", i), duration))
            .collect();
        SessionTimer::new(SessionPlan::new("test", exercises, rest, 1).unwrap())
    }

    #[test]
    fn ticks_do_nothing_before_start() {
        let mut timer = circuit(2, 3, 1);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining_seconds(), 3);
    }

    #[test]
    fn active_rest_active_sequence() {
        let mut timer = circuit(2, 2, 1);
        timer.start();

        assert_eq!(timer.tick(), None);
        assert_eq!(
            timer.tick(),
            Some(TimerEvent::RestStarted {
                after_step: 0,
                seconds: 1
            })
        );
        assert_eq!(timer.phase(), Phase::Resting);
        assert_eq!(timer.tick(), Some(TimerEvent::StepStarted { index: 1, round: 1 }));
        assert_eq!(timer.phase(), Phase::Active);
        assert_eq!(timer.remaining_seconds(), 2);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.tick(), Some(TimerEvent::Completed));
        assert!(timer.is_completed());
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn zero_rest_goes_straight_to_next_step() {
        let mut timer = circuit(2, 1, 0);
        timer.start();
        assert_eq!(timer.tick(), Some(TimerEvent::StepStarted { index: 1, round: 1 }));
        assert_eq!(timer.tick(), Some(TimerEvent::Completed));
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let mut timer = circuit(1, 10, 0);
        timer.start();
        timer.tick();
        timer.tick();
        assert!(timer.pause());
        assert!(!timer.pause());
        for _ in 0..5 {
            assert_eq!(timer.tick(), None);
        }
        assert_eq!(timer.remaining_seconds(), 8);
        assert!(timer.resume());
        timer.tick();
        assert_eq!(timer.remaining_seconds(), 7);
    }

    #[test]
    fn reset_rewinds_and_stops() {
        let mut timer = circuit(3, 2, 1);
        timer.start();
        for _ in 0..4 {
            timer.tick();
        }
        assert_eq!(timer.current_step_index(), 1);

        timer.reset();
        assert_eq!(timer.current_step_index(), 0);
        assert_eq!(timer.phase(), Phase::Active);
        assert_eq!(timer.remaining_seconds(), 2);
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn manual_navigation() {
        let mut timer = SessionTimer::new(SessionPlan::yoga());
        timer.start();
        assert_eq!(timer.previous_step(), Some(TimerEvent::StepStarted { index: 0, round: 1 }));
        for index in 1..5 {
            assert_eq!(timer.next_step(), Some(TimerEvent::StepStarted { index, round: 1 }));
        }
        assert_eq!(timer.current_step().unwrap().name, "Child's Pose");
        assert_eq!(timer.next_step(), Some(TimerEvent::Completed));
        assert_eq!(timer.next_step(), None);
        assert_eq!(timer.previous_step(), None);
    }

    #[test]
    fn next_step_skips_rest() {
        let mut timer = circuit(3, 2, 5);
        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.phase(), Phase::Resting);
        timer.next_step();
        assert_eq!(timer.phase(), Phase::Active);
        assert_eq!(timer.current_step_index(), 1);
    }

    #[test]
    fn rounds_are_tracked() {
        let mut timer = SessionTimer::new(SessionPlan::workout(1, 2).unwrap());
        timer.start();
        for _ in 0..4 {
            timer.next_step();
        }
        assert_eq!(timer.current_round(), 2);
        assert_eq!(timer.current_step().unwrap().name, "High Knees");

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.total_rounds, 2);
        assert_eq!(snapshot.total_steps, 8);
        assert_eq!(snapshot.clock, "00:45");
    }

    #[test]
    fn progress_moves_through_phase() {
        let mut timer = circuit(1, 4, 0);
        timer.start();
        assert_eq!(timer.phase_progress(), 0.0);
        timer.tick();
        assert_eq!(timer.phase_progress(), 0.25);
    }
}
