use anyhow::Result;
use sqlx::PgPool;

use crate::models::goal::GoalRow;

/// Fields for a new goal, already normalised by the handler.
pub struct NewGoal<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
    pub goal_type: &'a str,
    pub target: i32,
    pub current: i32,
    pub due_date: Option<&'a str>,
    pub completed: bool,
}

/// User-initiated edit. `None` leaves the column as is.
#[derive(Default)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub target: Option<i32>,
    pub current: Option<i32>,
    pub completed: bool,
}

/// A user's goals, newest first.
pub async fn list_goals(pool: &PgPool, user_id: &str) -> Result<Vec<GoalRow>> {
    Ok(sqlx::query_as::<_, GoalRow>(
        "SELECT * FROM evergreeners.goals WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Goal `id` if it belongs to `user_id`.
pub async fn find_goal(pool: &PgPool, id: i32, user_id: &str) -> Result<Option<GoalRow>> {
    Ok(sqlx::query_as::<_, GoalRow>(
        "SELECT * FROM evergreeners.goals WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

pub async fn insert_goal(pool: &PgPool, goal: NewGoal<'_>) -> Result<GoalRow> {
    Ok(sqlx::query_as::<_, GoalRow>(
        r#"
        INSERT INTO evergreeners.goals
            (user_id, title, type, target, current, due_date, completed, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(goal.user_id)
    .bind(goal.title)
    .bind(goal.goal_type)
    .bind(goal.target)
    .bind(goal.current)
    .bind(goal.due_date)
    .bind(goal.completed)
    .fetch_one(pool)
    .await?)
}

pub async fn update_goal(pool: &PgPool, id: i32, changes: GoalChanges) -> Result<GoalRow> {
    Ok(sqlx::query_as::<_, GoalRow>(
        r#"
        UPDATE evergreeners.goals
        SET title = COALESCE($2, title),
            due_date = COALESCE($3, due_date),
            target = COALESCE($4, target),
            current = COALESCE($5, current),
            completed = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.due_date)
    .bind(changes.target)
    .bind(changes.current)
    .bind(changes.completed)
    .fetch_one(pool)
    .await?)
}

/// Deletes goal `id` owned by `user_id`; `false` when nothing matched.
pub async fn delete_goal(pool: &PgPool, id: i32, user_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM evergreeners.goals WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Sync-side write: only progress columns, never user-owned fields.
pub async fn update_goal_progress(
    pool: &PgPool,
    id: i32,
    current: i32,
    completed: bool,
) -> Result<()> {
    sqlx::query(
        "UPDATE evergreeners.goals SET current = $2, completed = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(current)
    .bind(completed)
    .execute(pool)
    .await?;
    Ok(())
}
