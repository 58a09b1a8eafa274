mod leaderboard_history;
mod league;
mod profile;
mod rotation_watermark;

pub use leaderboard_history::LeaderboardHistory;
pub use league::League;
pub use profile::Profile;
pub use rotation_watermark::RotationWatermark;
