//! HTTP endpoint handlers

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{info, warn};

use super::responses::{ApiResponse, HealthResponse, StatusResponse};
use crate::{
    error::{ChatError, TrackerError},
    services::{ChatMessage, PromptLogEntry},
    state::{AppState, SessionKind},
    storage::{PersistedStat, StatKey},
    timer::SessionSnapshot,
    trackers::{vital_cards, BlogPost, CalorieSummary, ChecklistTask, Meal, NewMeal, VitalCard, WaterSummary},
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, StatusCode>;

#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: f64,
}

#[derive(Debug, Deserialize)]
pub struct BurnedRequest {
    pub calories: f64,
}

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Optional overrides for a new session
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    pub minutes: Option<u32>,
    pub rest_seconds: Option<u32>,
    pub rounds: Option<u32>,
}

/// Body for endpoints where it may be left out. Only an empty body means
/// "use the defaults"; anything else must parse.
fn optional_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, StatusCode> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|e| {
        warn!("Rejected request body: {}", e);
        StatusCode::BAD_REQUEST
    })
}

fn parse_stat(key: &str) -> Result<StatKey, StatusCode> {
    key.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })
}

fn parse_kind(kind: &str) -> Result<SessionKind, StatusCode> {
    kind.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })
}

fn tracker_status(e: TrackerError) -> StatusCode {
    warn!("Rejected tracker request: {}", e);
    match e {
        TrackerError::NotFound { .. } => StatusCode::NOT_FOUND,
        TrackerError::Empty(_) | TrackerError::NotPositive { .. } => StatusCode::BAD_REQUEST,
    }
}

fn no_session(kind: SessionKind) -> StatusCode {
    warn!("No {} session is active", kind);
    StatusCode::NOT_FOUND
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Handle GET /status - Uptime, every stat and running sessions
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();
    let stats = state
        .stats
        .snapshot()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    Json(StatusResponse {
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        stats,
        sessions: state.sessions.snapshots().await,
        last_action,
        last_action_time,
    })
}

/// Handle GET /stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HashMap<&'static str, f64>>> {
    Json(ApiResponse::ok("Current stats", state.stats.snapshot()))
}

/// Handle GET /stats/:key
pub async fn stat_get_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<PersistedStat> {
    let key = parse_stat(&key)?;
    Ok(Json(ApiResponse::ok(format!("Current {}", key), state.stats.persisted(key))))
}

/// Handle PUT /stats/:key
pub async fn stat_update_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<ValueRequest>,
) -> ApiResult<PersistedStat> {
    let key = parse_stat(&key)?;
    if !body.value.is_finite() {
        warn!("Rejected non-finite value for {}", key);
        return Err(StatusCode::BAD_REQUEST);
    }

    state.stats.update(key, body.value);
    state.record_action(&format!("update {}", key));
    info!("Stat {} updated to {}", key, body.value);
    Ok(Json(ApiResponse::ok(format!("{} updated", key), state.stats.persisted(key))))
}

/// Handle POST /stats/:key/reset
pub async fn stat_reset_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<PersistedStat> {
    let key = parse_stat(&key)?;
    state.stats.reset(key);
    state.record_action(&format!("reset {}", key));
    Ok(Json(ApiResponse::ok(format!("{} reset", key), state.stats.persisted(key))))
}

/// Handle POST /reset - Restore every stat and document
pub async fn reset_all_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HashMap<&'static str, f64>>> {
    state.reset_all();
    state.record_action("reset all");
    Json(ApiResponse::ok("All data reset", state.stats.snapshot()))
}

/// Handle GET /water
pub async fn water_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<WaterSummary>> {
    Json(ApiResponse::ok("Water intake", state.water.summary()))
}

/// Handle POST /water/add - Body is optional and defaults to one glass
pub async fn water_add_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<WaterSummary> {
    let amount = optional_body::<AmountRequest>(&body)?.map_or(1.0, |b| b.amount);
    state.water.add(amount).map_err(tracker_status)?;
    state.record_action("water add");
    Ok(Json(ApiResponse::ok("Water added", state.water.summary())))
}

/// Handle POST /water/remove
pub async fn water_remove_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<WaterSummary>> {
    state.water.remove();
    state.record_action("water remove");
    Json(ApiResponse::ok("Water removed", state.water.summary()))
}

/// Handle POST /water/reset
pub async fn water_reset_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<WaterSummary>> {
    state.water.reset();
    state.record_action("water reset");
    Json(ApiResponse::ok("Water reset", state.water.summary()))
}

/// Handle POST /water/goal
pub async fn water_goal_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GoalRequest>,
) -> ApiResult<WaterSummary> {
    state.water.set_goal(body.goal).map_err(tracker_status)?;
    state.record_action("water goal");
    Ok(Json(ApiResponse::ok("Water goal updated", state.water.summary())))
}

/// Handle GET /calories
pub async fn calories_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CalorieSummary>> {
    Json(ApiResponse::ok("Calorie budget", state.calories.summary()))
}

/// Handle POST /calories/meals
pub async fn meal_add_handler(
    State(state): State<Arc<AppState>>,
    Json(meal): Json<NewMeal>,
) -> ApiResult<Meal> {
    let meal = state.calories.add_meal(meal).map_err(tracker_status)?;
    state.record_action("meal add");
    Ok(Json(ApiResponse::ok(format!("Logged {}", meal.name), meal)))
}

/// Handle DELETE /calories/meals/:id
pub async fn meal_delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Meal> {
    let meal = state.calories.delete_meal(id).map_err(tracker_status)?;
    state.record_action("meal delete");
    Ok(Json(ApiResponse::ok(format!("Removed {}", meal.name), meal)))
}

/// Handle POST /calories/burned
pub async fn calories_burned_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BurnedRequest>,
) -> ApiResult<CalorieSummary> {
    state.calories.add_burned(body.calories).map_err(tracker_status)?;
    state.record_action("calories burned");
    Ok(Json(ApiResponse::ok("Burned calories added", state.calories.summary())))
}

/// Handle POST /calories/goal
pub async fn calories_goal_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GoalRequest>,
) -> ApiResult<CalorieSummary> {
    state.calories.set_goal(body.goal).map_err(tracker_status)?;
    state.record_action("calorie goal");
    Ok(Json(ApiResponse::ok("Calorie goal updated", state.calories.summary())))
}

/// Handle GET /dashboard
pub async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<VitalCard>>> {
    Json(ApiResponse::ok("Vitals", vital_cards(&state.stats)))
}

/// Handle GET /blogs
pub async fn blogs_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<BlogPost>>> {
    Json(ApiResponse::ok("Featured articles", state.blogs.posts()))
}

/// Handle POST /blogs/:id/like
pub async fn blog_like_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<BlogPost> {
    let post = state.blogs.toggle_like(id).map_err(tracker_status)?;
    state.record_action("blog like");
    let message = if post.liked { "Post liked" } else { "Post unliked" };
    Ok(Json(ApiResponse::ok(message, post)))
}

/// Handle GET /tasks
pub async fn tasks_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<ChecklistTask>>> {
    Json(ApiResponse::ok("Workout tasks", state.checklist.tasks()))
}

/// Handle POST /tasks
pub async fn task_add_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TaskRequest>,
) -> ApiResult<ChecklistTask> {
    let task = state.checklist.add(&body.text).map_err(tracker_status)?;
    state.record_action("task add");
    Ok(Json(ApiResponse::ok("Task added", task)))
}

/// Handle PUT /tasks/:id
pub async fn task_edit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<TaskRequest>,
) -> ApiResult<ChecklistTask> {
    let task = state.checklist.edit(id, &body.text).map_err(tracker_status)?;
    state.record_action("task edit");
    Ok(Json(ApiResponse::ok("Task updated", task)))
}

/// Handle POST /tasks/:id/toggle
pub async fn task_toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<ChecklistTask> {
    let task = state.checklist.toggle(id).map_err(tracker_status)?;
    state.record_action("task toggle");
    Ok(Json(ApiResponse::ok("Task toggled", task)))
}

/// Handle DELETE /tasks/:id
pub async fn task_delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<ChecklistTask> {
    let task = state.checklist.delete(id).map_err(tracker_status)?;
    state.record_action("task delete");
    Ok(Json(ApiResponse::ok("Task deleted", task)))
}

/// Handle GET /sessions/:kind
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<SessionSnapshot> {
    let kind = parse_kind(&kind)?;
    let snapshot = state.sessions.snapshot(kind).await.ok_or_else(|| no_session(kind))?;
    Ok(Json(ApiResponse::ok(format!("{} session", kind), snapshot)))
}

/// Handle POST /sessions/:kind/start - Replaces any running session of the kind
pub async fn session_start_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    body: Bytes,
) -> ApiResult<SessionSnapshot> {
    let kind = parse_kind(&kind)?;
    let request: StartRequest = optional_body(&body)?.unwrap_or_default();

    let plan = state
        .plan_for(kind, request.minutes, request.rest_seconds, request.rounds)
        .map_err(|e| {
            warn!("Rejected {} plan: {}", kind, e);
            StatusCode::BAD_REQUEST
        })?;

    let snapshot = state.sessions.start(kind, plan).await;
    state.record_action(&format!("{} start", kind));
    info!("{} session started", kind);
    Ok(Json(ApiResponse::ok(format!("{} session started", kind), snapshot)))
}

/// Session operations that act on an existing session
#[derive(Debug, Clone, Copy)]
enum SessionOp {
    Pause,
    Resume,
    Reset,
    Stop,
    Next,
    Previous,
}

impl SessionOp {
    fn as_str(self) -> &'static str {
        match self {
            SessionOp::Pause => "paused",
            SessionOp::Resume => "resumed",
            SessionOp::Reset => "reset",
            SessionOp::Stop => "stopped",
            SessionOp::Next => "advanced",
            SessionOp::Previous => "moved back",
        }
    }
}

async fn session_op(state: Arc<AppState>, kind: String, op: SessionOp) -> ApiResult<SessionSnapshot> {
    let kind = parse_kind(&kind)?;
    let sessions = &state.sessions;
    let snapshot = match op {
        SessionOp::Pause => sessions.pause(kind).await,
        SessionOp::Resume => sessions.resume(kind).await,
        SessionOp::Reset => sessions.reset(kind).await,
        SessionOp::Stop => sessions.stop(kind).await,
        SessionOp::Next => sessions.next_step(kind).await,
        SessionOp::Previous => sessions.previous_step(kind).await,
    }
    .ok_or_else(|| no_session(kind))?;

    let message = format!("{} session {}", kind, op.as_str());
    state.record_action(&message);
    info!("{}", message);
    Ok(Json(ApiResponse::ok(message, snapshot)))
}

/// Handle POST /sessions/:kind/pause
pub async fn session_pause_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<SessionSnapshot> {
    session_op(state, kind, SessionOp::Pause).await
}

/// Handle POST /sessions/:kind/resume
pub async fn session_resume_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<SessionSnapshot> {
    session_op(state, kind, SessionOp::Resume).await
}

/// Handle POST /sessions/:kind/reset
pub async fn session_reset_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<SessionSnapshot> {
    session_op(state, kind, SessionOp::Reset).await
}

/// Handle POST /sessions/:kind/stop
pub async fn session_stop_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<SessionSnapshot> {
    session_op(state, kind, SessionOp::Stop).await
}

/// Handle POST /sessions/:kind/next
pub async fn session_next_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<SessionSnapshot> {
    session_op(state, kind, SessionOp::Next).await
}

/// Handle POST /sessions/:kind/previous
pub async fn session_previous_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<SessionSnapshot> {
    session_op(state, kind, SessionOp::Previous).await
}

/// Handle GET /chat
pub async fn chat_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<ChatMessage>>> {
    Json(ApiResponse::ok("Chat transcript", state.chat.transcript()))
}

/// Handle POST /chat - A generation failure is still a 200 with an error envelope
pub async fn chat_send_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> ApiResult<ChatMessage> {
    let reply = state.chat.send(&body.message).await.map_err(|e| {
        warn!("Rejected chat message: {}", e);
        match e {
            ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
            ChatError::Unavailable | ChatError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    })?;
    state.record_action("chat");

    if reply.is_error {
        Ok(Json(ApiResponse::error("Assistant unavailable", reply)))
    } else {
        Ok(Json(ApiResponse::ok("Assistant replied", reply)))
    }
}

/// Handle DELETE /chat
pub async fn chat_clear_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<ChatMessage>>> {
    state.chat.clear();
    state.record_action("chat clear");
    Json(ApiResponse::ok("Chat cleared", state.chat.transcript()))
}

/// Handle GET /chat/logs
pub async fn chat_logs_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<PromptLogEntry>>> {
    Json(ApiResponse::ok("Prompt log", state.chat.prompt_log()))
}

/// Handle DELETE /chat/logs
pub async fn chat_logs_clear_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<PromptLogEntry>>> {
    state.chat.clear_prompt_log();
    state.record_action("prompt log clear");
    Json(ApiResponse::ok("Prompt log cleared", state.chat.prompt_log()))
}
