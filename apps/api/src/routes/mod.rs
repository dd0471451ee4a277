pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::goals::handlers as goals;
use crate::state::AppState;
use crate::sync::handlers as sync;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Sync
        .route("/api/user/sync-github", post(sync::handle_sync_github))
        // Profile & leaderboard
        .route(
            "/api/user/profile",
            get(users::handle_get_profile).put(users::handle_update_profile),
        )
        .route("/api/leaderboard", get(users::handle_leaderboard))
        // Goals
        .route(
            "/api/goals",
            get(goals::handle_list_goals).post(goals::handle_create_goal),
        )
        .route(
            "/api/goals/:id",
            put(goals::handle_update_goal).delete(goals::handle_delete_goal),
        )
        .with_state(state)
}
