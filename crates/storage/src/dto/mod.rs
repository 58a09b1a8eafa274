pub mod common;
pub mod history;
pub mod leaderboard;
pub mod league;
