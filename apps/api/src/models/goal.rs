use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::goals::kind::GoalKind;

/// Row of `evergreeners.goals`.
///
/// `title`, `target` and `due_date` belong to the user; sync only ever
/// rewrites `current` and `completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GoalRow {
    pub id: i32,
    pub user_id: String,
    pub title: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub goal_type: String,
    pub target: i32,
    pub current: i32,
    pub due_date: Option<String>,
    pub completed: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl GoalRow {
    pub fn kind(&self) -> GoalKind {
        GoalKind::classify(&self.goal_type, &self.title)
    }
}
