//! FitSync - A local fitness tracker with session timers and daily stats
//!
//! This library provides date-scoped persisted stats, a tick-driven session
//! timer shared by workouts, meditation and yoga, per-feature trackers and
//! the HTTP API that exposes them.

pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod timer;
pub mod trackers;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use storage::{StatKey, StatStore};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
