//! State management module
//!
//! The application state handed to every handler, and the registry of
//! running session timers.

pub mod app_state;
pub mod sessions;

pub use app_state::{AppState, SessionDefaults};
pub use sessions::{SessionKind, Sessions};
