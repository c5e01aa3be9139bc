use fitsync::timer::{Phase, SessionPlan, SessionTimer, Step, TimerEvent};

fn plan(steps: u32, duration: u32, rest: u32) -> SessionPlan {
    let exercises = (0..steps)
        .map(|i| Step::new(format!("step {}", i), duration))
        .collect();
    SessionPlan::new("property", exercises, rest, 1).unwrap()
}

/// Tick until completion, checking the countdown on every tick
fn run_to_completion(timer: &mut SessionTimer) -> u64 {
    let mut ticks = 0;
    timer.start();
    while !timer.is_completed() {
        let before = timer.remaining_seconds();
        let event = timer.tick();
        ticks += 1;
        if event.is_some() && event != Some(TimerEvent::Completed) {
            assert_eq!(before, 1, "transition happened before the countdown reached zero");
        }
        assert!(ticks < 100_000, "timer never completed");
    }
    ticks
}

#[test]
fn circuit_completes_after_225_ticks() {
    let mut timer = SessionTimer::new(plan(4, 45, 15));
    assert_eq!(run_to_completion(&mut timer), 225);
    assert_eq!(timer.phase(), Phase::Completed);
    assert_eq!(timer.remaining_seconds(), 0);
    assert!(!timer.is_running());
}

#[test]
fn total_ticks_match_durations_and_rests() {
    for (n, d, r) in [(1, 1, 0), (1, 30, 10), (3, 5, 0), (5, 7, 3), (2, 60, 20)] {
        let mut timer = SessionTimer::new(plan(n, d, r));
        let expected = u64::from(n * d + (n - 1) * r);
        assert_eq!(run_to_completion(&mut timer), expected, "n={} d={} r={}", n, d, r);
    }
}

#[test]
fn rounds_repeat_the_exercises_with_rest_between() {
    let exercises = vec![Step::new("a", 10), Step::new("b", 10)];
    let mut timer = SessionTimer::new(SessionPlan::new("rounds", exercises, 5, 3).unwrap());
    // 6 steps of 10s and 5 rests of 5s
    assert_eq!(run_to_completion(&mut timer), 85);
}

#[test]
fn ticks_after_completion_do_nothing() {
    let mut timer = SessionTimer::new(plan(1, 2, 0));
    run_to_completion(&mut timer);
    assert_eq!(timer.tick(), None);
    assert_eq!(timer.remaining_seconds(), 0);
    assert_eq!(timer.phase(), Phase::Completed);
}

#[test]
fn paused_timer_does_not_advance() {
    let mut timer = SessionTimer::new(plan(2, 10, 5));
    timer.start();
    timer.tick();
    assert!(timer.pause());
    for _ in 0..20 {
        assert_eq!(timer.tick(), None);
    }
    assert_eq!(timer.remaining_seconds(), 9);
    assert!(timer.resume());
    timer.tick();
    assert_eq!(timer.remaining_seconds(), 8);
}
