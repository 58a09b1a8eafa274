pub mod error;
pub mod ladder;
pub mod leaderboard;
pub mod orchestrator;
pub mod policy;
pub mod postgres;
pub mod recorder;
pub mod resetter;
pub mod schedule;
pub mod standings;
pub mod traits;

#[cfg(test)]
pub(crate) mod memory;

pub use error::{Result, RotationError};
pub use ladder::TierLadder;
pub use leaderboard::LeaderboardReader;
pub use orchestrator::{
    DEFAULT_POLL_INTERVAL, RotationOrchestrator, RotationOutcome, RotationReport, RotationSettings,
};
pub use policy::{Movement, RotationPlan, TierMove, TierPosition};
pub use postgres::{PgHistoryStore, PgLeagueCatalog, PgProfileStore, PgWatermarkStore};
pub use recorder::{HistoryRecorder, SnapshotSummary};
pub use resetter::AccumulatorResetter;
pub use schedule::{RotationPeriod, RotationSchedule};
pub use standings::Standings;
pub use traits::{
    HistoryStore, LeagueCatalog, ProfileStore, RotationPorts, StandingsStore, WatermarkStore,
};
