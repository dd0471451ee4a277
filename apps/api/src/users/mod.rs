// Profiles and the public leaderboard.

pub mod handlers;
pub mod leaderboard;
pub mod repository;
