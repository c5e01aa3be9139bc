//! Running sessions, one per kind, each driven by its own ticker task

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    storage::{StatKey, StatStore},
    tasks::session_ticker_task,
    timer::{SessionPlan, SessionSnapshot, SessionTimer, TimerEvent},
};

pub type SharedTimer = Arc<Mutex<SessionTimer>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Workout,
    Meditation,
    Yoga,
}

impl SessionKind {
    pub const ALL: [SessionKind; 3] = [SessionKind::Workout, SessionKind::Meditation, SessionKind::Yoga];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Workout => "workout",
            SessionKind::Meditation => "meditation",
            SessionKind::Yoga => "yoga",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown session kind: {}", s))
    }
}

/// Lock a timer, recovering from poisoning since ticks leave it consistent
pub fn lock_timer(timer: &SharedTimer) -> MutexGuard<'_, SessionTimer> {
    timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Credit a finished session to the persisted counters
pub fn record_completion(stats: &StatStore, kind: SessionKind, plan: &SessionPlan) {
    match kind {
        SessionKind::Workout => {
            stats.add(StatKey::WorkoutSessions, 1.0);
            stats.add(StatKey::WorkoutMinutes, f64::from(plan.total_minutes()));
            stats.add(StatKey::WorkoutCalories, f64::from(plan.calories_estimate()));
        }
        SessionKind::Meditation => {
            stats.add(StatKey::MeditationSessions, 1.0);
            stats.add(StatKey::MeditationMinutes, f64::from(plan.total_minutes()));
        }
        SessionKind::Yoga => {
            stats.add(StatKey::YogaSessions, 1.0);
        }
    }
    info!("Recorded completed {} session '{}'", kind, plan.name());
}

struct ActiveSession {
    timer: SharedTimer,
    ticker: Option<JoinHandle<()>>,
}

/// All sessions the user currently has open
pub struct Sessions {
    stats: Arc<StatStore>,
    active: tokio::sync::Mutex<HashMap<SessionKind, ActiveSession>>,
}

impl Sessions {
    pub fn new(stats: Arc<StatStore>) -> Self {
        Self {
            stats,
            active: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Start `plan` from its first step, replacing any session of the same kind
    pub async fn start(&self, kind: SessionKind, plan: SessionPlan) -> SessionSnapshot {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.remove(&kind) {
            info!("Replacing running {} session", kind);
            cancel(previous.ticker).await;
        }

        let mut timer = SessionTimer::new(plan);
        timer.start();
        info!("Starting {} session '{}' ({} steps)", kind, timer.plan().name(), timer.total_steps());

        let snapshot = timer.snapshot();
        let timer = Arc::new(Mutex::new(timer));
        let ticker = Some(self.spawn_ticker(kind, &timer));
        active.insert(kind, ActiveSession { timer, ticker });
        snapshot
    }

    pub async fn pause(&self, kind: SessionKind) -> Option<SessionSnapshot> {
        let mut active = self.active.lock().await;
        let session = active.get_mut(&kind)?;
        cancel(session.ticker.take()).await;

        let mut timer = lock_timer(&session.timer);
        if timer.pause() {
            info!("Paused {} session at {}s remaining", kind, timer.remaining_seconds());
        }
        Some(timer.snapshot())
    }

    pub async fn resume(&self, kind: SessionKind) -> Option<SessionSnapshot> {
        let mut active = self.active.lock().await;
        let session = active.get_mut(&kind)?;

        let (resumed, snapshot) = {
            let mut timer = lock_timer(&session.timer);
            let resumed = timer.resume();
            (resumed, timer.snapshot())
        };
        if resumed && session.ticker.is_none() {
            info!("Resuming {} session", kind);
            session.ticker = Some(self.spawn_ticker(kind, &session.timer));
        }
        Some(snapshot)
    }

    /// Back to the first step, stopped. Nothing is recorded.
    pub async fn reset(&self, kind: SessionKind) -> Option<SessionSnapshot> {
        let mut active = self.active.lock().await;
        let session = active.get_mut(&kind)?;
        cancel(session.ticker.take()).await;

        let mut timer = lock_timer(&session.timer);
        timer.reset();
        info!("Reset {} session", kind);
        Some(timer.snapshot())
    }

    /// Tear the session down; returns its last state
    pub async fn stop(&self, kind: SessionKind) -> Option<SessionSnapshot> {
        let session = self.active.lock().await.remove(&kind)?;
        cancel(session.ticker).await;
        info!("Stopped {} session", kind);
        let snapshot = lock_timer(&session.timer).snapshot();
        Some(snapshot)
    }

    pub async fn next_step(&self, kind: SessionKind) -> Option<SessionSnapshot> {
        self.navigate(kind, SessionTimer::next_step).await
    }

    pub async fn previous_step(&self, kind: SessionKind) -> Option<SessionSnapshot> {
        self.navigate(kind, SessionTimer::previous_step).await
    }

    pub async fn snapshot(&self, kind: SessionKind) -> Option<SessionSnapshot> {
        let active = self.active.lock().await;
        let session = active.get(&kind)?;
        let snapshot = lock_timer(&session.timer).snapshot();
        Some(snapshot)
    }

    pub async fn snapshots(&self) -> HashMap<SessionKind, SessionSnapshot> {
        let active = self.active.lock().await;
        active
            .iter()
            .map(|(kind, session)| (*kind, lock_timer(&session.timer).snapshot()))
            .collect()
    }

    /// Cancel every ticker; used on shutdown
    pub async fn stop_all(&self) {
        let mut active = self.active.lock().await;
        for (kind, session) in active.drain() {
            debug!("Stopping {} ticker for shutdown", kind);
            cancel(session.ticker).await;
        }
    }

    async fn navigate(
        &self,
        kind: SessionKind,
        step: fn(&mut SessionTimer) -> Option<TimerEvent>,
    ) -> Option<SessionSnapshot> {
        let mut active = self.active.lock().await;
        let session = active.get_mut(&kind)?;

        let (event, snapshot, plan) = {
            let mut timer = lock_timer(&session.timer);
            let event = step(&mut *timer);
            (event, timer.snapshot(), timer.plan().clone())
        };

        if event == Some(TimerEvent::Completed) {
            cancel(session.ticker.take()).await;
            info!("{} session completed by skipping the last step", kind);
            record_completion(&self.stats, kind, &plan);
        }
        Some(snapshot)
    }

    fn spawn_ticker(&self, kind: SessionKind, timer: &SharedTimer) -> JoinHandle<()> {
        tokio::spawn(session_ticker_task(kind, Arc::clone(timer), Arc::clone(&self.stats)))
    }
}

impl fmt::Debug for Sessions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sessions").finish_non_exhaustive()
    }
}

/// Abort a ticker and wait until it can no longer fire
async fn cancel(ticker: Option<JoinHandle<()>>) {
    if let Some(handle) = ticker {
        handle.abort();
        if let Err(e) = handle.await {
            if e.is_panic() {
                warn!("Session ticker panicked: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::NaiveDate;

    use crate::{
        storage::{FixedClock, MemoryStore, Storage},
        tasks::PersistHandle,
    };

    fn sessions() -> (Sessions, Arc<StatStore>) {
        let backend = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
        let writer = PersistHandle::spawn(backend.clone());
        let stats = Arc::new(StatStore::new(Storage::new(backend, writer, clock)));
        (Sessions::new(Arc::clone(&stats)), stats)
    }

    #[test]
    fn kinds_parse() {
        assert_eq!("yoga".parse::<SessionKind>().unwrap(), SessionKind::Yoga);
        assert!("pilates".parse::<SessionKind>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn meditation_runs_to_completion_and_is_recorded() {
        let (sessions, stats) = sessions();
        sessions
            .start(SessionKind::Meditation, SessionPlan::meditation(1).unwrap())
            .await;

        tokio::time::sleep(Duration::from_millis(30_500)).await;
        let halfway = sessions.snapshot(SessionKind::Meditation).await.unwrap();
        assert_eq!(halfway.remaining_seconds, 30);

        tokio::time::sleep(Duration::from_secs(31)).await;
        let done = sessions.snapshot(SessionKind::Meditation).await.unwrap();
        assert!(!done.running);
        assert_eq!(done.remaining_seconds, 0);
        assert_eq!(stats.load(StatKey::MeditationSessions), 1.0);
        assert_eq!(stats.load(StatKey::MeditationMinutes), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_session_does_not_advance() {
        let (sessions, _) = sessions();
        sessions
            .start(SessionKind::Meditation, SessionPlan::meditation(1).unwrap())
            .await;
        tokio::time::sleep(Duration::from_millis(10_500)).await;

        let paused = sessions.pause(SessionKind::Meditation).await.unwrap();
        assert_eq!(paused.remaining_seconds, 50);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(
            sessions.snapshot(SessionKind::Meditation).await.unwrap().remaining_seconds,
            50
        );

        sessions.resume(SessionKind::Meditation).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(
            sessions.snapshot(SessionKind::Meditation).await.unwrap().remaining_seconds,
            45
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_session_never_completes() {
        let (sessions, stats) = sessions();
        sessions
            .start(SessionKind::Meditation, SessionPlan::meditation(1).unwrap())
            .await;
        tokio::time::sleep(Duration::from_millis(59_500)).await;
        sessions.stop(SessionKind::Meditation).await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(sessions.snapshot(SessionKind::Meditation).await.is_none());
        assert_eq!(stats.load(StatKey::MeditationSessions), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn skipping_through_yoga_records_once() {
        let (sessions, stats) = sessions();
        sessions.start(SessionKind::Yoga, SessionPlan::yoga()).await;
        for _ in 0..5 {
            sessions.next_step(SessionKind::Yoga).await.unwrap();
        }
        // already completed, further skips do nothing
        sessions.next_step(SessionKind::Yoga).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(stats.load(StatKey::YogaSessions), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_ticking_until_resumed() {
        let (sessions, _) = sessions();
        sessions.start(SessionKind::Yoga, SessionPlan::yoga()).await;
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        let reset = sessions.reset(SessionKind::Yoga).await.unwrap();
        assert_eq!(reset.remaining_seconds, 30);
        assert!(!reset.running);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(sessions.snapshot(SessionKind::Yoga).await.unwrap().remaining_seconds, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn skipping_through_a_workout_credits_the_plan() {
        let (sessions, stats) = sessions();
        let plan = SessionPlan::workout(15, 4).unwrap();
        let steps = plan.total_steps();
        sessions.start(SessionKind::Workout, plan).await;
        for _ in 0..steps {
            sessions.next_step(SessionKind::Workout).await.unwrap();
        }

        assert_eq!(stats.load(StatKey::WorkoutSessions), 1.0);
        assert_eq!(stats.load(StatKey::WorkoutMinutes), 16.0);
        assert_eq!(stats.load(StatKey::WorkoutCalories), 350.0);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_replaces_the_old_ticker() {
        let (sessions, stats) = sessions();
        sessions
            .start(SessionKind::Meditation, SessionPlan::meditation(1).unwrap())
            .await;
        tokio::time::sleep(Duration::from_millis(30_500)).await;

        sessions
            .start(SessionKind::Meditation, SessionPlan::meditation(2).unwrap())
            .await;
        // well past where the first sitting would have ended
        tokio::time::sleep(Duration::from_millis(31_500)).await;
        let snapshot = sessions.snapshot(SessionKind::Meditation).await.unwrap();
        assert!(snapshot.running);
        assert_eq!(snapshot.remaining_seconds, 89);
        assert_eq!(stats.load(StatKey::MeditationSessions), 0.0);

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(stats.load(StatKey::MeditationSessions), 1.0);
        assert_eq!(stats.load(StatKey::MeditationMinutes), 2.0);
    }

    #[tokio::test]
    async fn cancelling_a_panicked_ticker_is_quiet() {
        let handle = tokio::spawn(async { panic!("tick failed") });
        tokio::task::yield_now().await;
        cancel(Some(handle)).await;
        cancel(None).await;
    }
}
