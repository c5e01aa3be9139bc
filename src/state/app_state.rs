//! Main application state shared by every handler

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::sessions::{SessionKind, Sessions};
use crate::{
    error::PlanError,
    services::{ChatService, TextGenerator},
    storage::{StatStore, Storage},
    timer::{
        plan::{DEFAULT_MEDITATION_MINUTES, DEFAULT_REST_SECONDS, DEFAULT_WORKOUT_ROUNDS},
        SessionPlan,
    },
    trackers::{BlogFeed, CalorieTracker, Checklist, WaterTracker},
    utils::format_uptime,
};

/// Workout shape used when a start request does not override it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDefaults {
    pub rest_seconds: u32,
    pub rounds: u32,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            rest_seconds: DEFAULT_REST_SECONDS,
            rounds: DEFAULT_WORKOUT_ROUNDS,
        }
    }
}

/// Everything the API operates on. Built once and passed around explicitly.
pub struct AppState {
    pub stats: Arc<StatStore>,
    pub water: WaterTracker,
    pub calories: CalorieTracker,
    pub checklist: Checklist,
    pub blogs: BlogFeed,
    pub chat: ChatService,
    pub sessions: Sessions,
    pub session_defaults: SessionDefaults,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(
        storage: Storage,
        generator: Arc<dyn TextGenerator>,
        session_defaults: SessionDefaults,
        port: u16,
        host: String,
    ) -> Self {
        let stats = Arc::new(StatStore::new(storage.clone()));

        Self {
            water: WaterTracker::new(Arc::clone(&stats)),
            calories: CalorieTracker::new(Arc::clone(&stats)),
            checklist: Checklist::new(storage.clone()),
            blogs: BlogFeed::new(storage.clone()),
            chat: ChatService::new(storage, generator),
            sessions: Sessions::new(Arc::clone(&stats)),
            stats,
            session_defaults,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    /// Remember the most recent mutating request for the status endpoint
    pub fn record_action(&self, action: &str) {
        match self.last_action.lock() {
            Ok(mut last) => *last = Some((action.to_string(), Utc::now())),
            Err(e) => warn!("Failed to record last action: {}", e),
        }
    }

    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|last| last.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }

    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }

    /// Plan for a new session of `kind`; `minutes` only applies to meditation,
    /// `rest_seconds`/`rounds` only to workouts.
    pub fn plan_for(
        &self,
        kind: SessionKind,
        minutes: Option<u32>,
        rest_seconds: Option<u32>,
        rounds: Option<u32>,
    ) -> Result<SessionPlan, PlanError> {
        match kind {
            SessionKind::Workout => SessionPlan::workout(
                rest_seconds.unwrap_or(self.session_defaults.rest_seconds),
                rounds.unwrap_or(self.session_defaults.rounds),
            ),
            SessionKind::Meditation => {
                SessionPlan::meditation(minutes.unwrap_or(DEFAULT_MEDITATION_MINUTES))
            }
            SessionKind::Yoga => Ok(SessionPlan::yoga()),
        }
    }

    /// Restore every stat and document to its default
    pub fn reset_all(&self) {
        info!("Resetting all data");
        self.stats.reset_all();
        self.calories.reset();
        self.checklist.reset();
        self.blogs.reset();
        self.chat.clear();
        self.chat.clear_prompt_log();
    }

    /// Read everything persisted before serving, so request handlers never
    /// hit the backend for a first load
    pub fn preload(&self) {
        self.stats.preload();
        self.calories.meals();
        self.checklist.tasks();
        self.blogs.posts();
        self.chat.transcript();
        self.chat.prompt_log();
    }

    /// Stop every ticker and wait for queued writes
    pub async fn shutdown(&self) {
        self.sessions.stop_all().await;
        self.stats.storage().flush().await;
        info!("State flushed");
    }
}
