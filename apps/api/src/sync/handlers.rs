use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::stats::ContributionDay;
use crate::state::AppState;
use crate::sync::SyncOutcome;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub username: String,
    pub streak: u32,
    pub total_commits: u32,
    pub today_commits: u32,
    pub yesterday_commits: u32,
    pub weekly_commits: u32,
    pub active_days: u32,
    pub total_projects: u32,
    pub contribution_data: Vec<ContributionDay>,
}

impl From<SyncOutcome> for SyncResponse {
    fn from(outcome: SyncOutcome) -> Self {
        let stats = outcome.stats;
        Self {
            success: true,
            username: outcome.username,
            streak: stats.current_streak,
            total_commits: stats.total_commits,
            today_commits: stats.today_commits,
            yesterday_commits: stats.yesterday_commits,
            weekly_commits: stats.weekly_commits,
            active_days: stats.active_days,
            total_projects: stats.total_projects,
            contribution_data: stats.calendar,
        }
    }
}

/// POST /api/user/sync-github
///
/// Runs the full sync for the caller and returns the fresh numbers.
pub async fn handle_sync_github(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SyncResponse>, AppError> {
    let today = Utc::now().date_naive();
    let outcome = state.sync.sync_account(&user_id, today).await?;
    Ok(Json(SyncResponse::from(outcome)))
}
