//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        // Stats
        .route("/stats", get(stats_handler))
        .route("/stats/:key", get(stat_get_handler).put(stat_update_handler))
        .route("/stats/:key/reset", post(stat_reset_handler))
        .route("/reset", post(reset_all_handler))
        // Water
        .route("/water", get(water_handler))
        .route("/water/add", post(water_add_handler))
        .route("/water/remove", post(water_remove_handler))
        .route("/water/reset", post(water_reset_handler))
        .route("/water/goal", post(water_goal_handler))
        // Calories
        .route("/calories", get(calories_handler))
        .route("/calories/meals", post(meal_add_handler))
        .route("/calories/meals/:id", delete(meal_delete_handler))
        .route("/calories/burned", post(calories_burned_handler))
        .route("/calories/goal", post(calories_goal_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/blogs", get(blogs_handler))
        .route("/blogs/:id/like", post(blog_like_handler))
        // Checklist
        .route("/tasks", get(tasks_handler).post(task_add_handler))
        .route("/tasks/:id", put(task_edit_handler).delete(task_delete_handler))
        .route("/tasks/:id/toggle", post(task_toggle_handler))
        // Sessions
        .route("/sessions/:kind", get(session_handler))
        .route("/sessions/:kind/start", post(session_start_handler))
        .route("/sessions/:kind/pause", post(session_pause_handler))
        .route("/sessions/:kind/resume", post(session_resume_handler))
        .route("/sessions/:kind/reset", post(session_reset_handler))
        .route("/sessions/:kind/stop", post(session_stop_handler))
        .route("/sessions/:kind/next", post(session_next_handler))
        .route("/sessions/:kind/previous", post(session_previous_handler))
        // Chat
        .route("/chat", get(chat_handler).post(chat_send_handler).delete(chat_clear_handler))
        .route("/chat/logs", get(chat_logs_handler).delete(chat_logs_clear_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
