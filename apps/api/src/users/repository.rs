use anyhow::Result;
use sqlx::{FromRow, PgPool};

use crate::models::user::UserRow;

pub const LEADERBOARD_SIZE: i64 = 50;

/// Profile edit. `None` leaves the column as is.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
    pub is_public: Option<bool>,
    pub anonymous_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub image: Option<String>,
    pub streak: Option<i32>,
    pub total_commits: Option<i32>,
    pub weekly_commits: Option<i32>,
    pub yesterday_commits: Option<i32>,
    pub is_public: bool,
    pub anonymous_name: Option<String>,
}

pub async fn find_user(pool: &PgPool, user_id: &str) -> Result<Option<UserRow>> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM evergreeners.users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn update_profile(pool: &PgPool, user_id: &str, changes: &ProfileChanges) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE evergreeners.users
        SET name = COALESCE($2, name),
            username = COALESCE($3, username),
            bio = COALESCE($4, bio),
            location = COALESCE($5, location),
            website = COALESCE($6, website),
            image = COALESCE($7, image),
            is_public = COALESCE($8, is_public),
            anonymous_name = COALESCE($9, anonymous_name),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(&changes.name)
    .bind(&changes.username)
    .bind(&changes.bio)
    .bind(&changes.location)
    .bind(&changes.website)
    .bind(&changes.image)
    .bind(changes.is_public)
    .bind(&changes.anonymous_name)
    .execute(pool)
    .await?;
    Ok(())
}

/// Users with a live streak, longest first.
pub async fn leaderboard_rows(pool: &PgPool) -> Result<Vec<LeaderboardRow>> {
    Ok(sqlx::query_as::<_, LeaderboardRow>(
        r#"
        SELECT id, name, username, image, streak, total_commits, weekly_commits,
               yesterday_commits, is_public, anonymous_name
        FROM evergreeners.users
        WHERE streak > 0
        ORDER BY streak DESC, total_commits DESC NULLS LAST
        LIMIT $1
        "#,
    )
    .bind(LEADERBOARD_SIZE)
    .fetch_all(pool)
    .await?)
}
