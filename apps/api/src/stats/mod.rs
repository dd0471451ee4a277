//! Contribution statistics — pure reduction of a fetched contribution calendar
//! into the numbers shown on the dashboards and used by goal evaluation.
//!
//! Nothing in here touches the clock, the network or the database. "Today" is
//! always passed in by the caller so results are reproducible.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One calendar date's contribution count.
///
/// Serialized as `{"date": "YYYY-MM-DD", "contributionCount": n}`, which is both
/// the GitHub GraphQL shape and the shape stored in `users.contribution_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    #[serde(rename = "contributionCount")]
    pub count: u32,
}

/// A repository the user contributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub url: String,
    pub last_updated: DateTime<Utc>,
}

/// Raw material returned by the contribution fetcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedContributions {
    /// Every day of the trailing window, newest first.
    pub days: Vec<ContributionDay>,
    pub total_contributions: u32,
    pub total_projects: u32,
    pub projects: Vec<Project>,
}

/// Derived statistics, recomputed from scratch on every sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionStats {
    pub total_commits: u32,
    pub current_streak: u32,
    pub today_commits: u32,
    pub yesterday_commits: u32,
    /// Trailing seven days ending today.
    pub weekly_commits: u32,
    /// Positive days since this week's Monday.
    pub active_days: u32,
    pub total_projects: u32,
    pub projects: Vec<Project>,
    /// The calendar the numbers were derived from, newest first.
    pub calendar: Vec<ContributionDay>,
}

impl ContributionStats {
    /// Count recorded for `date`, zero when the calendar has no entry.
    pub fn count_on(&self, date: NaiveDate) -> u32 {
        count_on(&self.calendar, date)
    }
}

/// Reduces a fetched calendar into [`ContributionStats`] as of `today`.
pub fn compute_stats(fetched: &FetchedContributions, today: NaiveDate) -> ContributionStats {
    let mut calendar = fetched.days.clone();
    calendar.sort_by(|a, b| b.date.cmp(&a.date));

    let yesterday = today.pred_opt().unwrap_or(today);
    let by_date: HashMap<NaiveDate, u32> = calendar.iter().map(|d| (d.date, d.count)).collect();

    let week_ago = today.checked_sub_days(Days::new(6)).unwrap_or(today);
    let weekly_commits = sum_between(&by_date, week_ago, today);

    let monday = week_start(today);
    let active_days = monday
        .iter_days()
        .take_while(|d| *d <= today)
        .filter(|d| by_date.get(d).copied().unwrap_or(0) > 0)
        .count() as u32;

    ContributionStats {
        total_commits: fetched.total_contributions,
        current_streak: current_streak(&calendar, today, yesterday),
        today_commits: by_date.get(&today).copied().unwrap_or(0),
        yesterday_commits: by_date.get(&yesterday).copied().unwrap_or(0),
        weekly_commits,
        active_days,
        total_projects: fetched.total_projects,
        projects: fetched.projects.clone(),
        calendar,
    }
}

/// Monday of the calendar week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Streak over a newest-first calendar.
///
/// The most recent positive day anchors the run. An anchor on yesterday still
/// counts (today may be in progress); anything older means the chain is broken.
fn current_streak(calendar: &[ContributionDay], today: NaiveDate, yesterday: NaiveDate) -> u32 {
    let Some(start) = calendar.iter().position(|d| d.count > 0) else {
        return 0;
    };

    let last_active = calendar[start].date;
    if last_active < yesterday && last_active != today {
        return 0;
    }

    calendar[start..]
        .iter()
        .take_while(|d| d.count > 0)
        .count() as u32
}

fn sum_between(by_date: &HashMap<NaiveDate, u32>, from: NaiveDate, to: NaiveDate) -> u32 {
    by_date
        .iter()
        .filter(|(date, _)| **date >= from && **date <= to)
        .map(|(_, count)| *count)
        .sum()
}

fn count_on(calendar: &[ContributionDay], date: NaiveDate) -> u32 {
    calendar
        .iter()
        .find(|d| d.date == date)
        .map(|d| d.count)
        .unwrap_or(0)
}
