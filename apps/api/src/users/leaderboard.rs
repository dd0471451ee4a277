use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::users::repository::LeaderboardRow;

const ADJECTIVES: [&str; 5] = ["Hidden", "Secret", "Silent", "Quiet", "Mysterious"];
const NOUNS: [&str; 5] = ["Tree", "Leaf", "Sprout", "Root", "Seed"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub avatar: Option<String>,
    pub streak: i32,
    pub total_commits: i32,
    pub yesterday_commits: i32,
    pub weekly_commits: i32,
    /// Real username, only for public profiles.
    pub original_username: Option<String>,
}

/// Ranks rows already sorted by streak. Private users appear under their
/// anonymous name and without an avatar.
pub fn build_leaderboard(rows: Vec<LeaderboardRow>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let (username, avatar, original_username) = if row.is_public {
                (
                    row.username.clone().unwrap_or_else(|| row.name.clone()),
                    row.image,
                    row.username,
                )
            } else {
                let fallback = format!("User{}", row.id.chars().take(6).collect::<String>());
                (row.anonymous_name.unwrap_or(fallback), None, None)
            };

            LeaderboardEntry {
                rank: index + 1,
                username,
                avatar,
                streak: row.streak.unwrap_or(0),
                total_commits: row.total_commits.unwrap_or(0),
                yesterday_commits: row.yesterday_commits.unwrap_or(0),
                weekly_commits: row.weekly_commits.unwrap_or(0),
                original_username,
            }
        })
        .collect()
}

/// `<Adjective><Noun><0..999>`, e.g. `QuietSprout417`.
pub fn generate_anonymous_name<R: Rng>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Hidden");
    let noun = NOUNS.choose(rng).copied().unwrap_or("Tree");
    format!("{adjective}{noun}{}", rng.gen_range(0..1000))
}
