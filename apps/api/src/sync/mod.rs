//! Sync orchestration: GitHub → statistics → user row → goals.
//!
//! Two entry points share one pipeline: the on-demand endpoint syncs the
//! caller, the background loop syncs every connected user. Each run is a full
//! recomputation, so re-running it against unchanged GitHub data writes the
//! same values.

pub mod handlers;
pub mod scheduler;
pub mod store;

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::github_client::{ContributionSource, GithubError};
use crate::goals::evaluator::evaluate_goals;
use crate::models::user::SyncTarget;
use crate::stats::{compute_stats, ContributionStats};
use crate::sync::store::SyncStore;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no connected GitHub account")]
    NoAccount,

    #[error("GitHub fetch failed: {0}")]
    Github(#[from] GithubError),

    #[error("storage failed: {0}")]
    Store(#[from] anyhow::Error),
}

/// Result of one user's sync.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub username: String,
    pub stats: ContributionStats,
    pub goals_updated: usize,
}

/// Tally of one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct SyncPipeline {
    source: Arc<dyn ContributionSource>,
    store: Arc<dyn SyncStore>,
}

impl SyncPipeline {
    pub fn new(source: Arc<dyn ContributionSource>, store: Arc<dyn SyncStore>) -> Self {
        Self { source, store }
    }

    /// On-demand sync for one user. The GitHub login is resolved from the
    /// token, and the user is marked as connected.
    pub async fn sync_account(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<SyncOutcome, SyncError> {
        let token = self
            .store
            .github_token(user_id)
            .await?
            .filter(|t| !t.is_empty())
            .ok_or(SyncError::NoAccount)?;

        let login = self.source.viewer_login(&token).await?;
        self.run(user_id, &login, &token, today, true).await
    }

    /// Batch-path sync for one connected user. `Ok(None)` means there was no
    /// token to sync with.
    pub async fn sync_target(
        &self,
        target: &SyncTarget,
        today: NaiveDate,
    ) -> Result<Option<SyncOutcome>, SyncError> {
        let Some(token) = target.access_token.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let username = match target.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => username.to_string(),
            None => self.source.viewer_login(token).await?,
        };

        self.run(&target.user_id, &username, token, today, false)
            .await
            .map(Some)
    }

    /// Syncs every connected user, at most `concurrency` at a time. A failing
    /// user is logged and counted; the rest of the batch carries on.
    pub async fn sync_all(
        &self,
        today: NaiveDate,
        concurrency: usize,
    ) -> Result<BatchReport, SyncError> {
        let targets = self.store.connected_users().await?;
        info!("Found {} users to sync", targets.len());

        let pipeline = self;
        let outcomes: Vec<Result<Option<SyncOutcome>, SyncError>> = stream::iter(targets)
            .map(move |target| async move {
                let result = pipeline.sync_target(&target, today).await;
                if let Err(e) = &result {
                    error!("Failed to sync user {}: {e}", target.user_id);
                }
                result
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(Some(_)) => report.synced += 1,
                Ok(None) => report.skipped += 1,
                Err(_) => report.failed += 1,
            }
        }

        if report.failed > 0 {
            warn!(
                "Sync finished with failures: {} synced, {} skipped, {} failed",
                report.synced, report.skipped, report.failed
            );
        } else {
            info!(
                "Sync complete: {} synced, {} skipped",
                report.synced, report.skipped
            );
        }
        Ok(report)
    }

    #[instrument(skip(self, token))]
    async fn run(
        &self,
        user_id: &str,
        username: &str,
        token: &str,
        today: NaiveDate,
        mark_connected: bool,
    ) -> Result<SyncOutcome, SyncError> {
        let fetched = self.source.fetch_contributions(username, token).await?;
        let stats = compute_stats(&fetched, today);

        self.store.save_stats(user_id, &stats, mark_connected).await?;

        let goals = self.store.goals_for_user(user_id).await?;
        let mut goals_updated = 0;
        for evaluation in evaluate_goals(&goals, &stats, today)
            .into_iter()
            .filter(|e| e.changed)
        {
            self.store
                .save_goal_progress(evaluation.goal_id, evaluation.current, evaluation.completed)
                .await?;
            goals_updated += 1;
        }

        info!(
            "Synced {username}: streak {}, {} commits this week, {goals_updated} goals updated",
            stats.current_streak, stats.weekly_commits
        );

        Ok(SyncOutcome {
            username: username.to_string(),
            stats,
            goals_updated,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::models::goal::GoalRow;
    use crate::stats::tests::{calendar, date};
    use crate::stats::FetchedContributions;

    const TODAY: &str = "2024-06-13";

    /// GitHub stand-in keyed by username; tokens map to logins.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub calendars: HashMap<String, FetchedContributions>,
        pub logins: HashMap<String, String>,
    }

    #[async_trait]
    impl ContributionSource for FakeSource {
        async fn viewer_login(&self, token: &str) -> Result<String, GithubError> {
            self.logins.get(token).cloned().ok_or(GithubError::Status {
                status: 401,
                message: "Bad credentials".to_string(),
            })
        }

        async fn fetch_contributions(
            &self,
            username: &str,
            _token: &str,
        ) -> Result<FetchedContributions, GithubError> {
            self.calendars
                .get(username)
                .cloned()
                .ok_or_else(|| GithubError::Graphql(format!("Could not resolve {username}")))
        }
    }

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub targets: Vec<SyncTarget>,
        pub stats: Mutex<HashMap<String, ContributionStats>>,
        pub connected: Mutex<HashMap<String, bool>>,
        pub goals: Mutex<Vec<GoalRow>>,
        pub goal_writes: Mutex<usize>,
    }

    #[async_trait]
    impl SyncStore for MemoryStore {
        async fn connected_users(&self) -> anyhow::Result<Vec<SyncTarget>> {
            Ok(self.targets.clone())
        }

        async fn github_token(&self, user_id: &str) -> anyhow::Result<Option<String>> {
            Ok(self
                .targets
                .iter()
                .find(|t| t.user_id == user_id)
                .and_then(|t| t.access_token.clone()))
        }

        async fn save_stats(
            &self,
            user_id: &str,
            stats: &ContributionStats,
            mark_connected: bool,
        ) -> anyhow::Result<()> {
            self.stats
                .lock()
                .unwrap()
                .insert(user_id.to_string(), stats.clone());
            *self
                .connected
                .lock()
                .unwrap()
                .entry(user_id.to_string())
                .or_default() |= mark_connected;
            Ok(())
        }

        async fn goals_for_user(&self, user_id: &str) -> anyhow::Result<Vec<GoalRow>> {
            Ok(self
                .goals
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn save_goal_progress(
            &self,
            goal_id: i32,
            current: i32,
            completed: bool,
        ) -> anyhow::Result<()> {
            let mut goals = self.goals.lock().unwrap();
            if let Some(goal) = goals.iter_mut().find(|g| g.id == goal_id) {
                goal.current = current;
                goal.completed = completed;
            }
            *self.goal_writes.lock().unwrap() += 1;
            Ok(())
        }
    }

    pub(crate) fn target(user_id: &str, username: Option<&str>, token: Option<&str>) -> SyncTarget {
        SyncTarget {
            user_id: user_id.to_string(),
            username: username.map(str::to_string),
            access_token: token.map(str::to_string),
        }
    }

    fn contributions(counts_newest_first: &[u32]) -> FetchedContributions {
        FetchedContributions {
            days: calendar(date(TODAY), counts_newest_first),
            total_contributions: counts_newest_first.iter().sum(),
            total_projects: 2,
            projects: vec![],
        }
    }

    fn goal(id: i32, user_id: &str, goal_type: &str, title: &str, target: i32) -> GoalRow {
        GoalRow {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            goal_type: goal_type.to_string(),
            target,
            current: 0,
            due_date: None,
            completed: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn pipeline(source: FakeSource, store: Arc<MemoryStore>) -> SyncPipeline {
        SyncPipeline::new(Arc::new(source), store)
    }

    #[tokio::test]
    async fn test_batch_isolates_failing_user() {
        let mut source = FakeSource::default();
        source.calendars.insert("alice".into(), contributions(&[1, 1]));
        source.calendars.insert("carol".into(), contributions(&[0, 4, 4, 4]));
        // "bob" is unknown to the source and fails.

        let store = Arc::new(MemoryStore {
            targets: vec![
                target("a", Some("alice"), Some("tok-a")),
                target("b", Some("bob"), Some("tok-b")),
                target("c", Some("carol"), Some("tok-c")),
            ],
            ..Default::default()
        });

        let report = pipeline(source, store.clone())
            .sync_all(date(TODAY), 1)
            .await
            .unwrap();

        assert_eq!(
            report,
            BatchReport {
                synced: 2,
                skipped: 0,
                failed: 1
            }
        );
        let stats = store.stats.lock().unwrap();
        assert_eq!(stats["a"].current_streak, 2);
        assert_eq!(stats["c"].current_streak, 3);
        assert!(!stats.contains_key("b"));
    }

    #[tokio::test]
    async fn test_batch_with_concurrency_still_isolates() {
        let mut source = FakeSource::default();
        for name in ["u1", "u2", "u4", "u5"] {
            source.calendars.insert(name.into(), contributions(&[2]));
        }
        let store = Arc::new(MemoryStore {
            targets: ["u1", "u2", "u3", "u4", "u5"]
                .iter()
                .map(|u| target(u, Some(u), Some("tok")))
                .collect(),
            ..Default::default()
        });

        let report = pipeline(source, store.clone())
            .sync_all(date(TODAY), 3)
            .await
            .unwrap();

        assert_eq!(report.synced, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(store.stats.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_token_is_skipped() {
        let store = Arc::new(MemoryStore {
            targets: vec![target("a", Some("alice"), None), target("b", Some("bob"), Some(""))],
            ..Default::default()
        });
        let report = pipeline(FakeSource::default(), store.clone())
            .sync_all(date(TODAY), 1)
            .await
            .unwrap();
        assert_eq!(report.skipped, 2);
        assert!(store.stats.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_username_resolved_from_token() {
        let mut source = FakeSource::default();
        source.logins.insert("tok-a".into(), "alice".into());
        source.calendars.insert("alice".into(), contributions(&[3]));
        let store = Arc::new(MemoryStore {
            targets: vec![target("a", None, Some("tok-a"))],
            ..Default::default()
        });

        let report = pipeline(source, store.clone())
            .sync_all(date(TODAY), 1)
            .await
            .unwrap();
        assert_eq!(report.synced, 1);
        assert_eq!(store.stats.lock().unwrap()["a"].today_commits, 3);
    }

    #[tokio::test]
    async fn test_sync_updates_goals_and_is_idempotent() {
        let mut source = FakeSource::default();
        source
            .calendars
            .insert("alice".into(), contributions(&[0, 2, 3, 1, 0]));
        let store = Arc::new(MemoryStore {
            targets: vec![target("a", Some("alice"), Some("tok-a"))],
            goals: Mutex::new(vec![
                goal(1, "a", "streak", "Three in a row", 3),
                goal(2, "a", "commits", "Weekly commits", 10),
                goal(3, "a", "commits", "Monthly commits", 50),
            ]),
            ..Default::default()
        });
        let pipeline = pipeline(source, store.clone());
        let today = date(TODAY);

        let first = pipeline
            .sync_target(&store.targets[0], today)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.goals_updated, 2);
        let stats_after_first = store.stats.lock().unwrap()["a"].clone();
        let goals_after_first = store.goals.lock().unwrap().clone();

        let second = pipeline
            .sync_target(&store.targets[0], today)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.goals_updated, 0);
        assert_eq!(store.stats.lock().unwrap()["a"], stats_after_first);
        assert_eq!(*store.goals.lock().unwrap(), goals_after_first);

        let goals = store.goals.lock().unwrap();
        assert_eq!(goals[0].current, 3);
        assert!(goals[0].completed);
        assert_eq!(goals[1].current, 6);
        assert!(!goals[1].completed);
        // Monthly goal is not auto-tracked.
        assert_eq!(goals[2].current, 0);
        assert_eq!(*store.goal_writes.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_sync_account_marks_connected() {
        let mut source = FakeSource::default();
        source.logins.insert("tok-a".into(), "alice".into());
        source.calendars.insert("alice".into(), contributions(&[0, 3, 0]));
        let store = Arc::new(MemoryStore {
            targets: vec![target("a", Some("stale-name"), Some("tok-a"))],
            ..Default::default()
        });

        let outcome = pipeline(source, store.clone())
            .sync_account("a", date(TODAY))
            .await
            .unwrap();

        assert_eq!(outcome.username, "alice");
        assert_eq!(outcome.stats.current_streak, 1);
        assert_eq!(outcome.stats.yesterday_commits, 3);
        assert!(store.connected.lock().unwrap()["a"]);
    }

    #[tokio::test]
    async fn test_sync_account_without_token() {
        let store = Arc::new(MemoryStore::default());
        let err = pipeline(FakeSource::default(), store)
            .sync_account("nobody", date(TODAY))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NoAccount));
    }
}
