use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Row of `evergreeners.users`: identity, profile and the last sync snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub role: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub is_public: bool,
    pub anonymous_name: Option<String>,
    pub streak: Option<i32>,
    pub total_commits: Option<i32>,
    pub today_commits: Option<i32>,
    pub yesterday_commits: Option<i32>,
    pub weekly_commits: Option<i32>,
    pub active_days: Option<i32>,
    pub total_projects: Option<i32>,
    pub projects_data: Option<Value>,
    pub contribution_data: Option<Value>,
    pub is_github_connected: Option<bool>,
}

/// A GitHub-connected user as seen by the batch sync.
#[derive(Debug, Clone, FromRow)]
pub struct SyncTarget {
    pub user_id: String,
    pub username: Option<String>,
    pub access_token: Option<String>,
}
