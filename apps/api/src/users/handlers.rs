use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;
use crate::users::leaderboard::{build_leaderboard, generate_anonymous_name, LeaderboardEntry};
use crate::users::repository::{self, ProfileChanges};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
    pub is_public: Option<bool>,
    pub anonymous_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserRow,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub message: String,
    pub anonymous_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// GET /api/user/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = repository::find_user(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(ProfileResponse { user }))
}

/// PUT /api/user/profile
///
/// Going private without an anonymous name on file gets one generated.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, AppError> {
    let mut changes = ProfileChanges {
        name: req.name,
        username: req.username,
        bio: req.bio,
        location: req.location,
        website: req.website,
        image: req.image,
        is_public: req.is_public,
        anonymous_name: req.anonymous_name,
    };

    if changes.is_public == Some(false) && changes.anonymous_name.is_none() {
        let existing = repository::find_user(&state.db, &user_id).await?;
        if needs_anonymous_name(existing.as_ref()) {
            changes.anonymous_name = Some(generate_anonymous_name(&mut rand::thread_rng()));
        }
    }

    repository::update_profile(&state.db, &user_id, &changes).await?;
    info!("Updated profile for user {user_id}");

    Ok(Json(UpdateProfileResponse {
        success: true,
        message: "Profile updated successfully".to_string(),
        anonymous_name: changes.anonymous_name,
    }))
}

/// GET /api/leaderboard
pub async fn handle_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let rows = repository::leaderboard_rows(&state.db).await?;
    info!("Leaderboard: {} users with an active streak", rows.len());
    Ok(Json(LeaderboardResponse {
        leaderboard: build_leaderboard(rows),
    }))
}

fn needs_anonymous_name(user: Option<&UserRow>) -> bool {
    user.is_some_and(|u| u.anonymous_name.as_deref().map_or(true, str::is_empty))
}
