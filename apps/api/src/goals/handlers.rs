//! Axum route handlers for the Goals API. Plain CRUD scoped to the caller.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::goals::kind::{parse_weekday, GoalKind};
use crate::goals::repository::{self, GoalChanges, NewGoal};
use crate::models::goal::GoalRow;
use crate::models::user::UserRow;
use crate::state::AppState;
use crate::users::repository::find_user;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub goal_type: String,
    #[serde(deserialize_with = "int_or_string")]
    pub target: i32,
    pub current: Option<i32>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub target: Option<i32>,
    pub current: Option<i32>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    pub goals: Vec<GoalRow>,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub goal: GoalRow,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/goals
pub async fn handle_list_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<GoalsResponse>, AppError> {
    let goals = repository::list_goals(&state.db, &user_id).await?;
    Ok(Json(GoalsResponse { goals }))
}

/// POST /api/goals
///
/// Progress is seeded from the caller's last synced stats so a new goal does
/// not sit at zero until the next sync.
pub async fn handle_create_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateGoalRequest>,
) -> Result<Json<GoalResponse>, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if req.goal_type.trim().is_empty() {
        return Err(AppError::Validation("type cannot be empty".to_string()));
    }

    let kind = GoalKind::classify(req.goal_type.trim(), title);
    let user = find_user(&state.db, &user_id).await?;
    let current = user
        .as_ref()
        .and_then(|u| seed_current(&kind, req.due_date.as_deref(), u))
        .or(req.current)
        .unwrap_or(0);
    let completed = current >= req.target;

    info!(
        "Creating goal '{}' ({}) for user {}: {}/{}",
        title,
        kind.as_str(),
        user_id,
        current,
        req.target
    );

    let goal = repository::insert_goal(
        &state.db,
        NewGoal {
            user_id: &user_id,
            title,
            goal_type: kind.as_str(),
            target: req.target,
            current,
            due_date: req.due_date.as_deref(),
            completed,
        },
    )
    .await?;

    Ok(Json(GoalResponse { goal }))
}

/// PUT /api/goals/:id
pub async fn handle_update_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<GoalResponse>, AppError> {
    let existing = repository::find_goal(&state.db, id, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Goal {id} not found")))?;

    let changes = apply_changes(&existing, req);
    let goal = repository::update_goal(&state.db, id, changes).await?;
    Ok(Json(GoalResponse { goal }))
}

/// DELETE /api/goals/:id
pub async fn handle_delete_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>, AppError> {
    if !repository::delete_goal(&state.db, id, &user_id).await? {
        return Err(AppError::NotFound(format!("Goal {id} not found")));
    }
    Ok(Json(DeleteResponse { success: true }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Initial progress from the stored snapshot. Weekday-anchored day goals wait
/// for the next sync since they need the calendar.
fn seed_current(kind: &GoalKind, due_date: Option<&str>, user: &UserRow) -> Option<i32> {
    match kind {
        GoalKind::Streak => user.streak,
        GoalKind::WeeklyCommits => user.weekly_commits,
        GoalKind::Projects => user.total_projects,
        GoalKind::Days if due_date.and_then(parse_weekday).is_none() => user.active_days,
        _ => None,
    }
}

/// Completion follows the new numbers unless the caller sets it explicitly.
fn apply_changes(existing: &GoalRow, req: UpdateGoalRequest) -> GoalChanges {
    let current = req.current.unwrap_or(existing.current);
    let target = req.target.unwrap_or(existing.target);
    GoalChanges {
        completed: req.completed.unwrap_or(current >= target),
        title: req.title,
        due_date: req.due_date,
        target: req.target,
        current: req.current,
    }
}

/// Accepts `5` as well as `"5"`; the goals form posts the latter.
fn int_or_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i32),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
