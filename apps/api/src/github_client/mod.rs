/// GitHub client — the only place that talks to GitHub.
///
/// Fetches a user's contribution calendar over GraphQL and resolves the login
/// behind an OAuth access token over REST. Writes nothing anywhere; callers
/// decide what to persist.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::stats::{ContributionDay, FetchedContributions, Project};

pub mod queries;

const USER_AGENT: &str = "Evergreeners-App";

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("GitHub user '{0}' not found")]
    UserNotFound(String),
}

/// Source of contribution data. `GithubClient` is the production backend;
/// the sync tests substitute an in-memory one.
#[async_trait]
pub trait ContributionSource: Send + Sync {
    /// Login of the account that owns `token`.
    async fn viewer_login(&self, token: &str) -> Result<String, GithubError>;

    /// Full trailing-year calendar for `username`, newest day first.
    async fn fetch_contributions(
        &self,
        username: &str,
        token: &str,
    ) -> Result<FetchedContributions, GithubError>;
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Debug, Serialize)]
struct Variables<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorBody>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: Option<GithubUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GithubUser {
    repositories_contributed_to: RepositoryConnection,
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    total_count: u32,
    #[serde(default)]
    nodes: Vec<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name_with_owner: String,
    url: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionCalendar {
    total_contributions: u32,
    weeks: Vec<CalendarWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarWeek {
    contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    login: String,
}

impl From<GithubUser> for FetchedContributions {
    fn from(user: GithubUser) -> Self {
        let calendar = user.contributions_collection.contribution_calendar;
        // GitHub lists weeks and days oldest first.
        let mut days: Vec<ContributionDay> = calendar
            .weeks
            .into_iter()
            .flat_map(|w| w.contribution_days)
            .collect();
        days.reverse();

        let projects = user
            .repositories_contributed_to
            .nodes
            .into_iter()
            .map(|node| Project {
                name: node.name_with_owner,
                url: node.url,
                last_updated: node.updated_at,
            })
            .collect();

        FetchedContributions {
            days,
            total_contributions: calendar.total_contributions,
            total_projects: user.repositories_contributed_to.total_count,
            projects,
        }
    }
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    graphql_url: String,
    api_url: String,
}

impl GithubClient {
    pub fn new(graphql_url: &str, api_url: &str, timeout: Duration) -> Result<Self, GithubError> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()?,
            graphql_url: graphql_url.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContributionSource for GithubClient {
    async fn viewer_login(&self, token: &str) -> Result<String, GithubError> {
        let response = self
            .client
            .get(format!("{}/user", self.api_url))
            .bearer_auth(token)
            .header("accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let viewer: Viewer = response.json().await?;
        Ok(viewer.login)
    }

    async fn fetch_contributions(
        &self,
        username: &str,
        token: &str,
    ) -> Result<FetchedContributions, GithubError> {
        let body = GraphqlRequest {
            query: queries::CONTRIBUTIONS_QUERY,
            variables: Variables { username },
        };

        let response = self
            .client
            .post(&self.graphql_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GraphqlResponse<UserData> = response.json().await?;

        if let Some(first) = payload.errors.as_ref().and_then(|errors| errors.first()) {
            return Err(GithubError::Graphql(first.message.clone()));
        }

        let user = payload
            .data
            .and_then(|d| d.user)
            .ok_or_else(|| GithubError::UserNotFound(username.to_string()))?;

        let fetched = FetchedContributions::from(user);
        debug!(
            "Fetched {} contribution days and {} projects for {}",
            fetched.days.len(),
            fetched.projects.len(),
            username
        );
        Ok(fetched)
    }
}
