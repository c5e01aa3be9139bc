//! Day-boundary handling for persisted values

use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Source of "today" for daily resets
pub trait Clock: Send + Sync + 'static {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock for tests and day-rollover simulation
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        if let Ok(mut current) = self.today.lock() {
            *current = today;
        }
    }

    /// Move the clock forward by whole days
    pub fn advance_days(&self, days: u64) {
        if let Ok(mut current) = self.today.lock() {
            if let Some(next) = current.checked_add_days(chrono::Days::new(days)) {
                *current = next;
            }
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.today.lock() {
            Ok(today) => *today,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Whether a value survives the calendar day changing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Daily,
    Lifetime,
}

/// A value tagged with the day it was last written.
///
/// This is the on-disk shape of every slot: `{"value": ..., "date": "YYYY-MM-DD"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateScoped<T> {
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl<T> DateScoped<T> {
    pub fn new(value: T, date: NaiveDate) -> Self {
        Self {
            value,
            date: Some(date),
        }
    }

    /// A daily value is stale when it was not written today; lifetime values never are.
    pub fn is_stale(&self, scope: Scope, today: NaiveDate) -> bool {
        match scope {
            Scope::Daily => self.date != Some(today),
            Scope::Lifetime => false,
        }
    }
}
