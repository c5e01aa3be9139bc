//! Session timers shared by the workout, meditation and yoga features

pub mod plan;
pub mod session;

pub use plan::{SessionPlan, Step};
pub use session::{Phase, SessionSnapshot, SessionTimer, TimerEvent};
