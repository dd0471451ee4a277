use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:8080"];

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub github_graphql_url: String,
    pub github_api_url: String,
    pub github_timeout: Duration,
    pub sync_interval: Duration,
    pub sync_concurrency: usize,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs: u64 = parse_env("GITHUB_TIMEOUT_SECS", 15)?;
        let interval_minutes: u64 = parse_env("SYNC_INTERVAL_MINUTES", 60)?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            github_graphql_url: std::env::var("GITHUB_GRAPHQL_URL")
                .unwrap_or_else(|_| "https://api.github.com/graphql".to_string()),
            github_api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            github_timeout: Duration::from_secs(timeout_secs),
            sync_interval: Duration::from_secs(interval_minutes.max(1) * 60),
            sync_concurrency: parse_env::<usize>("SYNC_CONCURRENCY", 1)?.max(1),
            allowed_origins: allowed_origins(std::env::var("ALLOWED_ORIGINS").ok().as_deref()),
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Localhost dev origins plus any comma-separated extras.
fn allowed_origins(extra: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect();
    if let Some(extra) = extra {
        origins.extend(
            extra
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string),
        );
    }
    origins
}
