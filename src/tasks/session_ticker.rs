//! One-second tick source for a running session

use std::{sync::Arc, time::Duration};

use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use crate::{
    state::sessions::{lock_timer, record_completion, SessionKind, SharedTimer},
    storage::StatStore,
    timer::TimerEvent,
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that advances `timer` once per second until it completes
/// or the task is aborted.
///
/// Aborting is the only way to pause: the owner aborts the task and awaits
/// its handle, after which no further tick can land.
pub async fn session_ticker_task(kind: SessionKind, timer: SharedTimer, stats: Arc<StatStore>) {
    info!("Starting {} ticker", kind);

    // The first tick is one full period away, not immediate.
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

    loop {
        interval.tick().await;

        let (event, finished_plan, still_running) = {
            let mut timer = lock_timer(&timer);
            let event = timer.tick();
            let finished_plan = match event {
                Some(TimerEvent::Completed) => Some(timer.plan().clone()),
                _ => None,
            };
            (event, finished_plan, timer.is_running())
        };

        match event {
            Some(TimerEvent::Completed) => {
                info!("{} session completed", kind);
                if let Some(plan) = finished_plan {
                    record_completion(&stats, kind, &plan);
                }
                break;
            }
            Some(TimerEvent::RestStarted { after_step, seconds }) => {
                debug!("{} resting {}s after step {}", kind, seconds, after_step);
            }
            Some(TimerEvent::StepStarted { index, round }) => {
                debug!("{} step {} of round {} started", kind, index, round);
            }
            None => {}
        }

        if !still_running {
            debug!("{} timer no longer running, ticker exiting", kind);
            break;
        }
    }
}
