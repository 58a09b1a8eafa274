pub mod leaderboard;
pub mod leagues;
