use chrono::Weekday;

/// What a goal measures. Decided once when the goal is created and stored in
/// the `type` column, so evaluation never has to read the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalKind {
    Streak,
    /// Rolling seven-day commit count.
    WeeklyCommits,
    /// Free-form commit target the user tracks by hand.
    Commits,
    Days,
    Projects,
    Other(String),
}

impl GoalKind {
    /// Maps a stored `type` to a kind.
    ///
    /// Rows written before `commits_weekly` existed are typed `commits` and
    /// carry "weekly" in the title; those still count as weekly goals.
    pub fn classify(goal_type: &str, title: &str) -> Self {
        match goal_type {
            "streak" => Self::Streak,
            "commits_weekly" => Self::WeeklyCommits,
            "commits" if title.to_lowercase().contains("weekly") => Self::WeeklyCommits,
            "commits" => Self::Commits,
            "days" => Self::Days,
            "projects" => Self::Projects,
            other => Self::Other(other.to_string()),
        }
    }

    /// Value written to the `type` column.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Streak => "streak",
            Self::WeeklyCommits => "commits_weekly",
            Self::Commits => "commits",
            Self::Days => "days",
            Self::Projects => "projects",
            Self::Other(raw) => raw,
        }
    }
}

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Full English weekday name, any case. Abbreviations and free text are `None`.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    let raw = raw.trim().to_lowercase();
    WEEKDAYS
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, day)| *day)
}
