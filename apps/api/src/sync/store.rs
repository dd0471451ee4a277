//! Persistence seam for the sync pipeline.
//!
//! `PgSyncStore` is the production backend; the orchestrator tests run
//! against an in-memory implementation.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::goals::repository;
use crate::models::goal::GoalRow;
use crate::models::user::SyncTarget;
use crate::stats::ContributionStats;

#[async_trait]
pub trait SyncStore: Send + Sync {
    /// Every user flagged as GitHub-connected, with their GitHub token if any.
    async fn connected_users(&self) -> Result<Vec<SyncTarget>>;

    /// GitHub access token linked to `user_id`.
    async fn github_token(&self, user_id: &str) -> Result<Option<String>>;

    /// Overwrites the user's statistics snapshot.
    async fn save_stats(
        &self,
        user_id: &str,
        stats: &ContributionStats,
        mark_connected: bool,
    ) -> Result<()>;

    async fn goals_for_user(&self, user_id: &str) -> Result<Vec<GoalRow>>;

    async fn save_goal_progress(&self, goal_id: i32, current: i32, completed: bool) -> Result<()>;
}

pub struct PgSyncStore {
    pool: PgPool,
}

impl PgSyncStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[async_trait]
impl SyncStore for PgSyncStore {
    async fn connected_users(&self) -> Result<Vec<SyncTarget>> {
        Ok(sqlx::query_as::<_, SyncTarget>(
            r#"
            SELECT u.id AS user_id, u.username, a.access_token
            FROM evergreeners.users u
            JOIN evergreeners.accounts a
              ON a.user_id = u.id AND a.provider_id = 'github'
            WHERE u.is_github_connected = TRUE
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn github_token(&self, user_id: &str) -> Result<Option<String>> {
        let token: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT access_token FROM evergreeners.accounts
            WHERE user_id = $1 AND provider_id = 'github'
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token.flatten())
    }

    async fn save_stats(
        &self,
        user_id: &str,
        stats: &ContributionStats,
        mark_connected: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE evergreeners.users
            SET streak = $2,
                total_commits = $3,
                today_commits = $4,
                yesterday_commits = $5,
                weekly_commits = $6,
                active_days = $7,
                total_projects = $8,
                contribution_data = $9,
                projects_data = $10,
                is_github_connected = COALESCE(is_github_connected, FALSE) OR $11,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(column(stats.current_streak))
        .bind(column(stats.total_commits))
        .bind(column(stats.today_commits))
        .bind(column(stats.yesterday_commits))
        .bind(column(stats.weekly_commits))
        .bind(column(stats.active_days))
        .bind(column(stats.total_projects))
        .bind(Json(&stats.calendar))
        .bind(Json(&stats.projects))
        .bind(mark_connected)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn goals_for_user(&self, user_id: &str) -> Result<Vec<GoalRow>> {
        repository::list_goals(&self.pool, user_id).await
    }

    async fn save_goal_progress(&self, goal_id: i32, current: i32, completed: bool) -> Result<()> {
        repository::update_goal_progress(&self.pool, goal_id, current, completed).await
    }
}
