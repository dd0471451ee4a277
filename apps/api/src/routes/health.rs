use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::db;
use crate::state::AppState;

/// GET /health
/// Reports service version, sync cadence and whether the database answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = if db::ping(&state.db).await { "ok" } else { "unavailable" };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "evergreeners-api",
        "database": database,
        "syncIntervalMinutes": state.config.sync_interval.as_secs() / 60
    }))
}

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "hello": "world" }))
}
