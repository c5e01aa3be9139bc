//! API response structures

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{state::SessionKind, timer::SessionSnapshot};

/// Envelope shared by every data endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Create a new API response
    pub fn new(status: &str, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            data,
        }
    }

    /// Create a successful response
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new("ok", message, data)
    }

    /// Response for a request that was accepted but produced a failure the
    /// user should see, such as a chat generation error
    pub fn error(message: impl Into<String>, data: T) -> Self {
        Self::new("error", message, data)
    }
}

/// Server overview with every stat and running session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub stats: HashMap<String, f64>,
    pub sessions: HashMap<SessionKind, SessionSnapshot>,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
