//! Goal evaluation — recomputes `current`/`completed` for stored goals from a
//! fresh [`ContributionStats`].
//!
//! Per kind:
//! - streak          → current streak
//! - weekly commits  → rolling seven-day commits
//! - days            → with a weekday `dueDate`: consecutive active days from
//!                     that weekday of the current week, capped at `target` and
//!                     at Sunday; otherwise active days this calendar week
//! - projects        → total projects
//! - anything else   → left alone
//!
//! Every evaluated goal leaves with `completed == (current >= target)`.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::goals::kind::{parse_weekday, GoalKind};
use crate::models::goal::GoalRow;
use crate::stats::{week_start, ContributionStats};

/// Outcome for one evaluated goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEvaluation {
    pub goal_id: i32,
    pub target: i32,
    pub current: i32,
    pub completed: bool,
    /// Whether `current` or `completed` differs from the stored row.
    pub changed: bool,
}

/// Evaluates every goal the stats can speak to. Goals of kinds that are not
/// auto-tracked are absent from the result.
pub fn evaluate_goals(
    goals: &[GoalRow],
    stats: &ContributionStats,
    today: NaiveDate,
) -> Vec<GoalEvaluation> {
    goals
        .iter()
        .filter_map(|goal| {
            let current = progress_for(goal, stats, today)?;
            let completed = current >= goal.target;
            Some(GoalEvaluation {
                goal_id: goal.id,
                target: goal.target,
                current,
                completed,
                changed: current != goal.current || completed != goal.completed,
            })
        })
        .collect()
}

/// Progress value for one goal, `None` when the goal is not auto-tracked.
pub fn progress_for(goal: &GoalRow, stats: &ContributionStats, today: NaiveDate) -> Option<i32> {
    let value = match goal.kind() {
        GoalKind::Streak => stats.current_streak,
        GoalKind::WeeklyCommits => stats.weekly_commits,
        GoalKind::Days => match goal.due_date.as_deref().and_then(parse_weekday) {
            Some(start) => {
                consecutive_days_from(stats, today, start.num_days_from_monday(), goal.target)
            }
            None => stats.active_days,
        },
        GoalKind::Projects => stats.total_projects,
        GoalKind::Commits | GoalKind::Other(_) => return None,
    };
    Some(to_column(value))
}

/// Consecutive positive days starting at `start_offset` days after this week's
/// Monday, stopping at the first empty day, after `target` days, or at Sunday.
fn consecutive_days_from(
    stats: &ContributionStats,
    today: NaiveDate,
    start_offset: u32,
    target: i32,
) -> u32 {
    let monday = week_start(today);
    let wanted = u32::try_from(target).unwrap_or(0);

    let mut count = 0;
    for offset in (start_offset..=6).take(wanted as usize) {
        let Some(day) = monday.checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };
        if stats.count_on(day) == 0 {
            break;
        }
        count += 1;
    }
    count
}

fn to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::{calendar, date};
    use crate::stats::{compute_stats, FetchedContributions};

    // Thursday; the week runs Mon 2024-06-10 .. Sun 2024-06-16.
    const TODAY: &str = "2024-06-13";

    fn goal(id: i32, goal_type: &str, title: &str, target: i32) -> GoalRow {
        GoalRow {
            id,
            user_id: "user_1".to_string(),
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

    fn stats_for(counts_newest_first: &[u32]) -> ContributionStats {
        let today = date(TODAY);
        let fetched = FetchedContributions {
            days: calendar(today, counts_newest_first),
            total_contributions: 120,
            total_projects: 4,
            projects: vec![],
        };
        compute_stats(&fetched, today)
    }

    #[test]
    fn test_streak_goal_tracks_current_streak() {
        let stats = stats_for(&[1, 1, 1, 0]);
        let result = evaluate_goals(&[goal(1, "streak", "Keep it green", 3)], &stats, date(TODAY));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].current, 3);
        assert!(result[0].completed);
        assert!(result[0].changed);
    }

    #[test]
    fn test_weekly_commits_goal_uses_rolling_window() {
        let stats = stats_for(&[2, 0, 0, 0, 0, 0, 3, 50]);
        let result = evaluate_goals(
            &[goal(1, "commits", "Weekly commits", 10)],
            &stats,
            date(TODAY),
        );
        assert_eq!(result[0].current, 5);
        assert!(!result[0].completed);
    }

    #[test]
    fn test_commits_goal_without_weekly_title_is_untouched() {
        let stats = stats_for(&[9, 9, 9]);
        let mut monthly = goal(7, "commits", "Monthly commits", 100);
        monthly.current = 42;
        let result = evaluate_goals(&[monthly], &stats, date(TODAY));
        assert!(result.is_empty());
    }

    #[test]
    fn test_days_goal_from_monday_stops_at_first_gap() {
        // Thu 0, Wed 1, Tue 2, Mon 3.
        let stats = stats_for(&[0, 1, 2, 3]);
        let mut days = goal(3, "days", "Code five days straight", 5);
        days.due_date = Some("Monday".to_string());
        let result = evaluate_goals(&[days], &stats, date(TODAY));
        assert_eq!(result[0].current, 3);
        assert!(!result[0].completed);
    }

    #[test]
    fn test_days_goal_stops_at_end_of_week() {
        let today = date("2024-06-16"); // Sunday
        let fetched = FetchedContributions {
            days: calendar(today, &[1, 1, 1, 1]),
            ..Default::default()
        };
        let stats = compute_stats(&fetched, today);
        let mut days = goal(3, "days", "Weekend warrior", 5);
        days.due_date = Some("Friday".to_string());
        let result = evaluate_goals(&[days], &stats, today);
        // Fri, Sat, Sun then the week is over.
        assert_eq!(result[0].current, 3);
    }

    #[test]
    fn test_days_goal_capped_at_target() {
        let stats = stats_for(&[1, 1, 1, 1]);
        let mut days = goal(3, "days", "Two days", 2);
        days.due_date = Some("monday".to_string());
        let result = evaluate_goals(&[days], &stats, date(TODAY));
        assert_eq!(result[0].current, 2);
        assert!(result[0].completed);
    }

    #[test]
    fn test_days_goal_without_weekday_uses_active_days() {
        // Active Mon..Thu: Thu, Tue.
        let stats = stats_for(&[1, 0, 1, 0, 8]);
        let mut days = goal(3, "days", "Active days", 4);
        days.due_date = Some("end of month".to_string());
        let result = evaluate_goals(&[days], &stats, date(TODAY));
        assert_eq!(result[0].current, 2);
    }

    #[test]
    fn test_projects_goal() {
        let stats = stats_for(&[0]);
        let result = evaluate_goals(&[goal(4, "projects", "Spread out", 4)], &stats, date(TODAY));
        assert_eq!(result[0].current, 4);
        assert!(result[0].completed);
    }

    #[test]
    fn test_unchanged_goal_is_not_flagged() {
        let stats = stats_for(&[1, 1]);
        let mut streak = goal(1, "streak", "Streak", 5);
        streak.current = 2;
        let result = evaluate_goals(&[streak], &stats, date(TODAY));
        assert!(!result[0].changed);
    }

    #[test]
    fn test_manual_completion_is_rederived() {
        let stats = stats_for(&[1, 1]);
        let mut streak = goal(1, "streak", "Streak", 5);
        streak.current = 2;
        streak.completed = true;
        let result = evaluate_goals(&[streak], &stats, date(TODAY));
        assert!(!result[0].completed);
        assert!(result[0].changed);
    }

    #[test]
    fn test_completion_invariant_holds_for_all_evaluated_goals() {
        let stats = stats_for(&[3, 0, 2, 2, 1, 0, 4]);
        let mut on_tuesday = goal(5, "days", "From Tuesday", 2);
        on_tuesday.due_date = Some("Tuesday".to_string());
        let goals = vec![
            goal(1, "streak", "Streak", 1),
            goal(2, "commits_weekly", "Commits", 12),
            goal(3, "projects", "Projects", 10),
            goal(4, "days", "Days", 0),
            on_tuesday,
            goal(6, "mystery", "Unknown", 1),
        ];
        let result = evaluate_goals(&goals, &stats, date(TODAY));
        assert_eq!(result.len(), 5);
        for evaluation in result {
            assert_eq!(evaluation.completed, evaluation.current >= evaluation.target);
        }
    }
}
